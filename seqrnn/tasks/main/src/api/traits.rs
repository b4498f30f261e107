use rand::Rng;

use crate::api::error::TaskResult;
use crate::api::types::{Batch, Matrix, TaskKind};

/// A synthetic benchmark that produces labelled sequence batches.
pub trait SequenceTask {
    fn kind(&self) -> TaskKind;

    /// Draws `batch_size` independent samples, all using delay `delay`.
    fn generate_batch<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        batch_size: usize,
        delay: usize,
    ) -> TaskResult<Batch>;

    /// Number of output classes the readout must produce.
    fn num_classes(&self) -> usize;

    /// Width of a one-hot input vector able to hold every input code.
    fn one_hot_width(&self) -> usize;
}

/// A recurrent network driven one time step at a time.
pub trait SequenceModel {
    /// Clears the hidden state before a new batch of `batch_size` sequences.
    fn reset_state(&mut self, batch_size: usize);

    /// Consumes one encoded time step (`[batch][features]`) and returns the
    /// output logits (`[batch][classes]`).
    fn forward_step(&mut self, inputs: &[Vec<f32>]) -> TaskResult<Vec<Vec<f32>>>;

    fn parameters(&self) -> Vec<(&'static str, &Matrix)>;
    fn parameters_mut(&mut self) -> Vec<(&'static str, &mut Matrix)>;

    fn parameter_count(&self) -> usize {
        self.parameters().iter().map(|(_, p)| p.numel()).sum()
    }
}

/// A model whose gradients are computed by an external backend.
///
/// `backward` receives the loss gradient with respect to every logit the
/// last forward pass produced (`[time][batch][classes]`) and must leave the
/// parameter gradients in the matrices returned by `gradients_mut`, in the
/// same order as `parameters`.
pub trait Differentiable: SequenceModel {
    fn backward(&mut self, logit_grads: &[Vec<Vec<f32>>]) -> TaskResult<()>;

    fn gradients_mut(&mut self) -> Vec<&mut Matrix>;

    fn zero_grad(&mut self) {
        for grad in self.gradients_mut() {
            grad.fill(0.0);
        }
    }

    /// Secondary update for orthogonality-preserving parameters, run after
    /// gradient clipping and before the optimizer step.
    fn orthogonal_step(&mut self) -> TaskResult<()> {
        Ok(())
    }
}

/// Parameter update rule, applied once per training step.
pub trait Optimizer<N: ?Sized> {
    fn step(&mut self, network: &mut N) -> TaskResult<()>;

    fn lr(&self) -> f32;

    /// Opaque state stored alongside the parameters in a checkpoint.
    fn state(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    fn load_state(&mut self, _state: &serde_json::Value) -> TaskResult<()> {
        Ok(())
    }
}

/// Streaming destination for per-step scalars.
pub trait ScalarSink {
    fn add_scalar(&mut self, tag: &str, value: f64, step: usize) -> TaskResult<()>;
}
