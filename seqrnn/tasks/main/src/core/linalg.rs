//! Small dense linear algebra for weight initialization and the recurrent
//! forward pass. Matrices here are at most `hidden x hidden`, so plain
//! row-major loops in `f64` accumulation are enough.

use crate::api::error::{TaskError, TaskResult};
use crate::api::types::Matrix;

impl Matrix {
    /// `self @ other`.
    pub fn matmul(&self, other: &Matrix) -> TaskResult<Matrix> {
        if self.cols() != other.rows() {
            return Err(TaskError::ShapeMismatch {
                expected: vec![self.cols(), other.cols()],
                got: other.shape().to_vec(),
            });
        }
        let (m, k, n) = (self.rows(), self.cols(), other.cols());
        let mut out = Matrix::zeros(m, n);
        for i in 0..m {
            let a_row = self.row(i);
            for j in 0..n {
                let mut acc = 0.0f64;
                for p in 0..k {
                    acc += a_row[p] as f64 * other.get(p, j) as f64;
                }
                out.set(i, j, acc as f32);
            }
        }
        Ok(out)
    }

    pub fn transpose(&self) -> Matrix {
        Matrix::from_fn(self.cols(), self.rows(), |r, c| self.get(c, r))
    }

    /// `self @ x` for a vector `x` of length `cols`.
    pub fn matvec(&self, x: &[f32]) -> TaskResult<Vec<f32>> {
        if x.len() != self.cols() {
            return Err(TaskError::ShapeMismatch {
                expected: vec![self.cols()],
                got: vec![x.len()],
            });
        }
        Ok((0..self.rows())
            .map(|r| {
                self.row(r)
                    .iter()
                    .zip(x)
                    .map(|(&w, &v)| w as f64 * v as f64)
                    .sum::<f64>() as f32
            })
            .collect())
    }

    /// Elementwise `self + alpha * other`.
    pub fn add_scaled(&self, other: &Matrix, alpha: f32) -> TaskResult<Matrix> {
        if self.shape() != other.shape() {
            return Err(TaskError::ShapeMismatch {
                expected: self.shape().to_vec(),
                got: other.shape().to_vec(),
            });
        }
        let data = self
            .as_slice()
            .iter()
            .zip(other.as_slice())
            .map(|(&a, &b)| a + alpha * b)
            .collect();
        Matrix::from_vec(self.rows(), self.cols(), data)
    }
}

/// Largest absolute entry of `A + A^T`; zero for an exactly skew-symmetric `A`.
pub fn skew_error(a: &Matrix) -> f32 {
    let mut worst = 0.0f32;
    for i in 0..a.rows() {
        for j in 0..a.cols() {
            worst = worst.max((a.get(i, j) + a.get(j, i)).abs());
        }
    }
    worst
}

/// Largest absolute entry of `W^T W - I`; zero for an orthogonal `W`.
pub fn orthogonality_error(w: &Matrix) -> TaskResult<f32> {
    let gram = w.transpose().matmul(w)?;
    let mut worst = 0.0f32;
    for i in 0..gram.rows() {
        for j in 0..gram.cols() {
            let expected = if i == j { 1.0 } else { 0.0 };
            worst = worst.max((gram.get(i, j) - expected).abs());
        }
    }
    Ok(worst)
}

/// Solves `A X = B` by Gauss-Jordan elimination with partial pivoting.
pub fn solve(a: &Matrix, b: &Matrix) -> TaskResult<Matrix> {
    let n = a.rows();
    if a.cols() != n || b.rows() != n {
        return Err(TaskError::ShapeMismatch {
            expected: vec![n, n],
            got: vec![a.cols(), b.rows()],
        });
    }
    let m = b.cols();
    let mut lhs: Vec<Vec<f64>> = (0..n)
        .map(|r| a.row(r).iter().map(|&v| v as f64).collect())
        .collect();
    let mut rhs: Vec<Vec<f64>> = (0..n)
        .map(|r| b.row(r).iter().map(|&v| v as f64).collect())
        .collect();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| lhs[x][col].abs().total_cmp(&lhs[y][col].abs()))
            .unwrap_or(col);
        if lhs[pivot][col].abs() < 1e-12 {
            return Err(TaskError::Numerical(format!(
                "singular matrix: no pivot in column {col}"
            )));
        }
        lhs.swap(col, pivot);
        rhs.swap(col, pivot);

        let inv = 1.0 / lhs[col][col];
        lhs[col].iter_mut().for_each(|v| *v *= inv);
        rhs[col].iter_mut().for_each(|v| *v *= inv);

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = lhs[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                lhs[row][k] -= factor * lhs[col][k];
            }
            for k in 0..m {
                rhs[row][k] -= factor * rhs[col][k];
            }
        }
    }

    Ok(Matrix::from_fn(n, m, |r, c| rhs[r][c] as f32))
}

/// Cayley transform `(I + A)^-1 (I - A)`.
///
/// Maps a skew-symmetric `A` to an orthogonal matrix with no eigenvalue at
/// `-1`. `I + A` is always invertible when `A` is skew-symmetric.
pub fn cayley_transform(a: &Matrix) -> TaskResult<Matrix> {
    let n = a.rows();
    let eye = Matrix::identity(n);
    let lhs = eye.add_scaled(a, 1.0)?;
    let rhs = eye.add_scaled(a, -1.0)?;
    solve(&lhs, &rhs)
}

/// Orthonormalizes the columns of a square matrix (modified Gram-Schmidt)
/// and returns the Q factor, with column signs chosen so that `R` has a
/// positive diagonal.
pub fn orthonormalize(a: &Matrix) -> TaskResult<Matrix> {
    let n = a.rows();
    if a.cols() != n {
        return Err(TaskError::ShapeMismatch {
            expected: vec![n, n],
            got: a.shape().to_vec(),
        });
    }
    let mut cols: Vec<Vec<f64>> = (0..n)
        .map(|c| (0..n).map(|r| a.get(r, c) as f64).collect())
        .collect();

    for j in 0..n {
        for i in 0..j {
            let (done, rest) = cols.split_at_mut(j);
            let q = &done[i];
            let v = &mut rest[0];
            let dot: f64 = q.iter().zip(v.iter()).map(|(x, y)| x * y).sum();
            v.iter_mut().zip(q).for_each(|(vi, qi)| *vi -= dot * qi);
        }
        let norm = cols[j].iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm < 1e-12 {
            return Err(TaskError::Numerical(format!(
                "rank-deficient matrix at column {j}"
            )));
        }
        cols[j].iter_mut().for_each(|x| *x /= norm);
    }

    Ok(Matrix::from_fn(n, n, |r, c| cols[c][r] as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &Matrix, b: &Matrix, tol: f32) -> bool {
        a.shape() == b.shape()
            && a.as_slice()
                .iter()
                .zip(b.as_slice())
                .all(|(x, y)| (x - y).abs() <= tol)
    }

    #[test]
    fn test_matmul_and_transpose() {
        let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = a.transpose();
        assert_eq!(b.shape(), [3, 2]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.as_slice(), &[14.0, 32.0, 32.0, 77.0]);
        assert!(a.matmul(&a).is_err());
    }

    #[test]
    fn test_matvec() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(a.matvec(&[1.0, 1.0]).unwrap(), vec![3.0, 7.0]);
        assert!(a.matvec(&[1.0]).is_err());
    }

    #[test]
    fn test_solve_recovers_known_solution() {
        let a = Matrix::from_vec(3, 3, vec![2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 4.0]).unwrap();
        let x = Matrix::from_vec(3, 1, vec![1.0, -2.0, 0.5]).unwrap();
        let b = a.matmul(&x).unwrap();
        let solved = solve(&a, &b).unwrap();
        assert!(approx_eq(&solved, &x, 1e-5), "{solved:?}");
    }

    #[test]
    fn test_solve_rejects_singular() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        let b = Matrix::identity(2);
        assert!(matches!(solve(&a, &b), Err(TaskError::Numerical(_))));
    }

    #[test]
    fn test_cayley_of_skew_is_orthogonal() {
        let a = Matrix::from_vec(
            3,
            3,
            vec![0.0, 0.7, -1.2, -0.7, 0.0, 0.3, 1.2, -0.3, 0.0],
        )
        .unwrap();
        assert_eq!(skew_error(&a), 0.0);
        let w = cayley_transform(&a).unwrap();
        assert!(orthogonality_error(&w).unwrap() < 1e-5);
    }

    #[test]
    fn test_cayley_of_zero_is_identity() {
        let w = cayley_transform(&Matrix::zeros(4, 4)).unwrap();
        assert!(approx_eq(&w, &Matrix::identity(4), 1e-7));
    }

    #[test]
    fn test_orthonormalize() {
        let a = Matrix::from_vec(3, 3, vec![2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 4.0]).unwrap();
        let q = orthonormalize(&a).unwrap();
        assert!(orthogonality_error(&q).unwrap() < 1e-5);
        // first column is the normalized first column of `a`
        let norm = 5.0f32.sqrt();
        assert!((q.get(0, 0) - 2.0 / norm).abs() < 1e-6);
        assert!((q.get(1, 0) - 1.0 / norm).abs() < 1e-6);
    }
}
