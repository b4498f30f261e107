use crate::api::types::{Matrix, NormType};

/// Global gradient norm across all parameter gradients.
pub fn grad_norm(grads: &[&mut Matrix], norm_type: NormType) -> f32 {
    match norm_type {
        NormType::L2 => {
            let sq: f64 = grads
                .iter()
                .flat_map(|g| g.as_slice().iter())
                .map(|&x| (x as f64) * (x as f64))
                .sum();
            sq.sqrt() as f32
        }
        NormType::Inf => grads
            .iter()
            .flat_map(|g| g.as_slice().iter())
            .fold(0.0f32, |acc, &x| acc.max(x.abs())),
    }
}

/// Clip gradients by global norm.
///
/// Computes the total norm across all gradients. If `max_norm` is given and
/// the total norm exceeds it, every gradient is scaled by
/// `max_norm / total_norm`. With `max_norm = None` the gradients are left
/// untouched and only the norm is measured.
///
/// Returns the *original* (unclipped) total norm so callers can log it.
pub fn clip_grad_norm(grads: &mut [&mut Matrix], max_norm: Option<f32>, norm_type: NormType) -> f32 {
    let total_norm = grad_norm(grads, norm_type);

    if let Some(max_norm) = max_norm {
        if total_norm.is_finite() && total_norm > max_norm {
            let clip_coef = max_norm / (total_norm + 1e-6);
            for grad in grads.iter_mut() {
                grad.as_mut_slice().iter_mut().for_each(|x| *x *= clip_coef);
            }
        }
    }

    total_norm
}
