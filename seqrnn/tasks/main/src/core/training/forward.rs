use crate::api::error::TaskResult;
use crate::api::traits::SequenceModel;
use crate::api::types::{Batch, InputEncoding};
use crate::core::training::loss::{argmax, cross_entropy};
use crate::core::training::metrics::SequenceMetrics;

/// Result of running a model over one batch.
pub struct SequenceOutput {
    /// Mean over time steps of the batch-mean cross-entropy.
    pub loss: f64,
    /// Recall-window accuracy.
    pub accuracy: f64,
    /// d(loss)/d(logits), `[time][batch][classes]`, already scaled by
    /// `1 / seq_len` to match `loss`.
    pub logit_grads: Vec<Vec<Vec<f32>>>,
}

/// Feeds `batch` through `model` one time step at a time, scoring every
/// step's loss and the recall window's accuracy.
pub fn run_sequence<M: SequenceModel + ?Sized>(
    model: &mut M,
    batch: &Batch,
    encoding: InputEncoding,
) -> TaskResult<SequenceOutput> {
    let seq_len = batch.seq_len();
    model.reset_state(batch.len());

    let mut metrics = SequenceMetrics::new(batch.recall_start(), batch.c_length, batch.len());
    let mut logit_grads = Vec::with_capacity(seq_len);

    for t in 0..seq_len {
        let inputs = encoding.encode_step(&batch.inputs_at(t))?;
        let logits = model.forward_step(&inputs)?;
        let targets = batch.targets_at(t);
        let step = cross_entropy(&logits, &targets)?;
        let predictions: Vec<_> = logits.iter().map(|row| argmax(row)).collect();
        metrics.record(t, step.loss, &predictions, &targets);
        logit_grads.push(step.grads);
    }

    let scale = 1.0 / seq_len.max(1) as f32;
    for step in logit_grads.iter_mut() {
        for row in step.iter_mut() {
            row.iter_mut().for_each(|g| *g *= scale);
        }
    }

    Ok(SequenceOutput {
        loss: metrics.loss(),
        accuracy: metrics.accuracy(),
        logit_grads,
    })
}
