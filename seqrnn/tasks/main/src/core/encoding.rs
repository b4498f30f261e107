use crate::api::error::{TaskError, TaskResult};
use crate::api::types::{Code, InputEncoding};

impl InputEncoding {
    /// Encodes one time step of codes (one per batch element) into
    /// `[batch][features]`.
    pub fn encode_step(&self, codes: &[Code]) -> TaskResult<Vec<Vec<f32>>> {
        match *self {
            InputEncoding::Scalar => Ok(codes.iter().map(|&c| vec![c as f32]).collect()),
            InputEncoding::OneHot { width } => codes
                .iter()
                .map(|&c| {
                    if c >= width {
                        return Err(TaskError::ShapeMismatch {
                            expected: vec![width],
                            got: vec![c + 1],
                        });
                    }
                    let mut v = vec![0.0; width];
                    v[c] = 1.0;
                    Ok(v)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_encoding() {
        let enc = InputEncoding::Scalar;
        assert_eq!(enc.input_size(), 1);
        assert_eq!(enc.encode_step(&[0, 9, 3]).unwrap(), vec![vec![0.0], vec![9.0], vec![3.0]]);
    }

    #[test]
    fn test_one_hot_encoding() {
        let enc = InputEncoding::OneHot { width: 4 };
        let out = enc.encode_step(&[0, 3]).unwrap();
        assert_eq!(out[0], vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(out[1], vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_one_hot_rejects_code_outside_width() {
        let enc = InputEncoding::OneHot { width: 10 };
        assert!(enc.encode_step(&[10]).is_err());
    }
}
