//! Weight initializers for the recurrent cell.
//!
//! The orthogonal initializers start from a block-diagonal skew-symmetric
//! matrix `A` whose superdiagonal holds `floor(n / 2)` sampled values at
//! positions `(0, 1), (2, 3), ...`:
//!
//! - Henaff: values uniform in `[-pi, 0)`, `W = exp(A)`, which for this
//!   structure is a chain of 2x2 rotation blocks.
//! - Cayley: angles uniform in `[0, pi/2)` mapped to
//!   `-sqrt((1 - cos) / (1 + cos))`, `W = (I + A)^-1 (I - A)`.
//! - Random: Q factor of a standard Gaussian matrix.

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::api::error::{TaskError, TaskResult};
use crate::api::types::{InputInit, Matrix, RecurrentInit};
use crate::core::linalg::{cayley_transform, orthonormalize};

/// Builds the block-diagonal skew-symmetric matrix described in the module docs.
pub fn skew_from_blocks(values: &[f32], n: usize) -> TaskResult<Matrix> {
    if values.len() != n / 2 {
        return Err(TaskError::ShapeMismatch {
            expected: vec![n / 2],
            got: vec![values.len()],
        });
    }
    let mut a = Matrix::zeros(n, n);
    for (k, &s) in values.iter().enumerate() {
        let i = 2 * k;
        a.set(i, i + 1, s);
        a.set(i + 1, i, -s);
    }
    Ok(a)
}

/// Skew-symmetric generator for the Henaff initializer.
pub fn henaff_skew<R: Rng + ?Sized>(rng: &mut R, n: usize) -> TaskResult<Matrix> {
    let dist = Uniform::new(-std::f32::consts::PI, 0.0);
    let values: Vec<f32> = (0..n / 2).map(|_| dist.sample(rng)).collect();
    skew_from_blocks(&values, n)
}

/// Skew-symmetric generator for the Cayley initializer.
pub fn cayley_skew<R: Rng + ?Sized>(rng: &mut R, n: usize) -> TaskResult<Matrix> {
    let dist = Uniform::new(0.0f32, std::f32::consts::FRAC_PI_2);
    let values: Vec<f32> = (0..n / 2)
        .map(|_| {
            let theta = dist.sample(rng);
            -((1.0 - theta.cos()) / (1.0 + theta.cos())).sqrt()
        })
        .collect();
    skew_from_blocks(&values, n)
}

/// Matrix exponential of a block-diagonal skew-symmetric matrix built by
/// [`skew_from_blocks`]: every `[[0, s], [-s, 0]]` block becomes
/// `[[cos s, sin s], [-sin s, cos s]]`, a trailing odd row stays `1`.
pub fn exp_skew_blocks(a: &Matrix) -> Matrix {
    let n = a.rows();
    let mut w = Matrix::identity(n);
    for k in 0..n / 2 {
        let i = 2 * k;
        let s = a.get(i, i + 1);
        let (sin, cos) = s.sin_cos();
        w.set(i, i, cos);
        w.set(i, i + 1, sin);
        w.set(i + 1, i, -sin);
        w.set(i + 1, i + 1, cos);
    }
    w
}

pub fn henaff_init<R: Rng + ?Sized>(rng: &mut R, n: usize) -> TaskResult<Matrix> {
    Ok(exp_skew_blocks(&henaff_skew(rng, n)?))
}

pub fn cayley_init<R: Rng + ?Sized>(rng: &mut R, n: usize) -> TaskResult<Matrix> {
    cayley_transform(&cayley_skew(rng, n)?)
}

pub fn random_orthogonal_init<R: Rng + ?Sized>(rng: &mut R, n: usize) -> TaskResult<Matrix> {
    let gaussian = normal_matrix(rng, n, n, 1.0)?;
    orthonormalize(&gaussian)
}

/// Xavier (Glorot) normal: `std = sqrt(2 / (fan_in + fan_out))`.
pub fn xavier_normal<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize) -> TaskResult<Matrix> {
    let std = (2.0 / (rows + cols).max(1) as f64).sqrt();
    normal_matrix(rng, rows, cols, std)
}

/// Kaiming (He) normal, fan-in mode: `std = sqrt(2 / fan_in)`.
pub fn kaiming_normal<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize) -> TaskResult<Matrix> {
    let std = (2.0 / cols.max(1) as f64).sqrt();
    normal_matrix(rng, rows, cols, std)
}

/// Uniform in `[-bound, bound)`, as used for biases.
pub fn uniform_matrix<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize, bound: f32) -> Matrix {
    if bound <= 0.0 {
        return Matrix::zeros(rows, cols);
    }
    let dist = Uniform::new(-bound, bound);
    Matrix::from_fn(rows, cols, |_, _| dist.sample(rng))
}

fn normal_matrix<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize, std: f64) -> TaskResult<Matrix> {
    let normal = Normal::new(0.0, std)
        .map_err(|e| TaskError::InvalidConfig(format!("normal distribution (std={std}): {e}")))?;
    Ok(Matrix::from_fn(rows, cols, |_, _| normal.sample(rng) as f32))
}

impl RecurrentInit {
    /// Initializes an `n x n` hidden-to-hidden matrix.
    pub fn init<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> TaskResult<Matrix> {
        match self {
            RecurrentInit::Henaff => henaff_init(rng, n),
            RecurrentInit::Cayley => cayley_init(rng, n),
            RecurrentInit::Random => random_orthogonal_init(rng, n),
            RecurrentInit::Xavier => xavier_normal(rng, n, n),
            RecurrentInit::Kaiming => kaiming_normal(rng, n, n),
        }
    }
}

impl InputInit {
    /// Initializes a `rows x cols` input-to-hidden matrix (`[hidden, input]`).
    pub fn init<R: Rng + ?Sized>(&self, rng: &mut R, rows: usize, cols: usize) -> TaskResult<Matrix> {
        match self {
            InputInit::Xavier => xavier_normal(rng, rows, cols),
            InputInit::Kaiming => kaiming_normal(rng, rows, cols),
        }
    }
}
