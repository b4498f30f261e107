use crate::api::error::{TaskError, TaskResult};
use crate::api::types::Nonlinearity;

impl Nonlinearity {
    /// Applies the nonlinearity to pre-activations `z` in place.
    ///
    /// `bias` is the per-unit modReLU threshold; the other variants add it to
    /// `z` before activating.
    pub fn apply(&self, z: &mut [f32], bias: &[f32]) -> TaskResult<()> {
        if z.len() != bias.len() {
            return Err(TaskError::ShapeMismatch {
                expected: vec![z.len()],
                got: vec![bias.len()],
            });
        }
        match self {
            Nonlinearity::ModRelu => {
                for (v, &b) in z.iter_mut().zip(bias) {
                    let magnitude = (v.abs() + b).max(0.0);
                    *v = if *v > 0.0 {
                        magnitude
                    } else if *v < 0.0 {
                        -magnitude
                    } else {
                        0.0
                    };
                }
            }
            other => {
                for (v, &b) in z.iter_mut().zip(bias) {
                    let x = *v + b;
                    *v = match other {
                        Nonlinearity::None => x,
                        Nonlinearity::Relu => x.max(0.0),
                        Nonlinearity::Tanh => x.tanh(),
                        Nonlinearity::Sigmoid => 1.0 / (1.0 + (-x).exp()),
                        Nonlinearity::ModRelu => unreachable!("handled above"),
                    };
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modrelu_keeps_sign_and_shrinks_magnitude() {
        let mut z = vec![2.0, -2.0, 0.5, -0.5, 0.0];
        Nonlinearity::ModRelu.apply(&mut z, &[-1.0; 5]).unwrap();
        assert_eq!(z, vec![1.0, -1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_elementwise_variants() {
        let mut relu = vec![-1.0, 1.0];
        Nonlinearity::Relu.apply(&mut relu, &[0.5, 0.5]).unwrap();
        assert_eq!(relu, vec![0.0, 1.5]);

        let mut none = vec![-1.0, 1.0];
        Nonlinearity::None.apply(&mut none, &[0.0, 1.0]).unwrap();
        assert_eq!(none, vec![-1.0, 2.0]);

        let mut sig = vec![0.0];
        Nonlinearity::Sigmoid.apply(&mut sig, &[0.0]).unwrap();
        assert!((sig[0] - 0.5).abs() < 1e-7);

        let mut tanh = vec![0.0];
        Nonlinearity::Tanh.apply(&mut tanh, &[0.0]).unwrap();
        assert_eq!(tanh[0], 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let mut z = vec![1.0, 2.0];
        assert!(Nonlinearity::Tanh.apply(&mut z, &[0.0]).is_err());
    }
}
