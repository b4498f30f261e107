use crate::api::error::{TaskError, TaskResult};
use crate::api::types::Code;

/// Cross-entropy of one time step, averaged over the batch.
pub struct StepLoss {
    pub loss: f32,
    /// d(loss)/d(logits), `[batch][classes]`.
    pub grads: Vec<Vec<f32>>,
}

/// Numerically stable softmax cross-entropy against class-index targets.
///
/// Logits are raw scores of shape `[batch][classes]`:
///   log_softmax = x - log(sum(exp(x - max(x)))) - max(x)
///   loss = -mean(log_softmax[target])
///   grad = (softmax - onehot(target)) / batch
pub fn cross_entropy(logits: &[Vec<f32>], targets: &[Code]) -> TaskResult<StepLoss> {
    if logits.len() != targets.len() {
        return Err(TaskError::ShapeMismatch {
            expected: vec![targets.len()],
            got: vec![logits.len()],
        });
    }
    let batch = logits.len().max(1) as f32;
    let mut total = 0.0f64;
    let mut grads = Vec::with_capacity(logits.len());

    for (row, &target) in logits.iter().zip(targets) {
        if target >= row.len() {
            return Err(TaskError::ShapeMismatch {
                expected: vec![row.len()],
                got: vec![target + 1],
            });
        }
        let max_val = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = row.iter().map(|&x| (x - max_val).exp()).collect();
        let sum: f32 = exps.iter().sum();
        let log_sum_exp = sum.ln() + max_val;

        total += (log_sum_exp - row[target]) as f64;

        let mut grad: Vec<f32> = exps.iter().map(|&e| e / sum / batch).collect();
        grad[target] -= 1.0 / batch;
        grads.push(grad);
    }

    Ok(StepLoss {
        loss: (total / batch as f64) as f32,
        grads,
    })
}

/// Index of the largest logit; the first one wins ties.
pub fn argmax(row: &[f32]) -> Code {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}
