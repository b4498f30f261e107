use rand::Rng;

use crate::api::error::{TaskError, TaskResult};
use crate::api::types::Matrix;
use crate::core::nn::init::{uniform_matrix, xavier_normal};

/// Linear readout: `y = W x + b`.
/// Xavier normal weights, bias uniform in `[-1/sqrt(in), 1/sqrt(in))`.
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Matrix, // [out_features, in_features]
    bias: Matrix,   // [1, out_features]
}

impl Linear {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, in_features: usize, out_features: usize) -> TaskResult<Self> {
        let weight = xavier_normal(rng, out_features, in_features)?;
        let bound = 1.0 / (in_features.max(1) as f32).sqrt();
        let bias = uniform_matrix(rng, 1, out_features, bound);
        Ok(Self { weight, bias })
    }

    pub fn from_parts(weight: Matrix, bias: Matrix) -> TaskResult<Self> {
        if bias.shape() != [1, weight.rows()] {
            return Err(TaskError::ShapeMismatch {
                expected: vec![1, weight.rows()],
                got: bias.shape().to_vec(),
            });
        }
        Ok(Self { weight, bias })
    }

    pub fn in_features(&self) -> usize {
        self.weight.cols()
    }

    pub fn out_features(&self) -> usize {
        self.weight.rows()
    }

    pub fn forward(&self, x: &[f32]) -> TaskResult<Vec<f32>> {
        let mut y = self.weight.matvec(x)?;
        y.iter_mut()
            .zip(self.bias.as_slice())
            .for_each(|(v, &b)| *v += b);
        Ok(y)
    }

    pub fn weight(&self) -> &Matrix {
        &self.weight
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub fn parameters_mut(&mut self) -> [&mut Matrix; 2] {
        [&mut self.weight, &mut self.bias]
    }
}
