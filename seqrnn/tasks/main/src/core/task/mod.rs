pub mod copy;
pub mod denoise;

use rand::Rng;

use crate::api::error::TaskResult;
use crate::api::traits::SequenceTask;
use crate::api::types::{Batch, TaskKind};

pub use copy::CopyTask;
pub use denoise::DenoiseTask;

/// Runtime choice between the two benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Copy(CopyTask),
    Denoise(DenoiseTask),
}

impl SequenceTask for Task {
    fn kind(&self) -> TaskKind {
        match self {
            Task::Copy(t) => t.kind(),
            Task::Denoise(t) => t.kind(),
        }
    }

    fn generate_batch<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        batch_size: usize,
        delay: usize,
    ) -> TaskResult<Batch> {
        match self {
            Task::Copy(t) => t.generate_batch(rng, batch_size, delay),
            Task::Denoise(t) => t.generate_batch(rng, batch_size, delay),
        }
    }

    fn num_classes(&self) -> usize {
        match self {
            Task::Copy(t) => t.num_classes(),
            Task::Denoise(t) => t.num_classes(),
        }
    }

    fn one_hot_width(&self) -> usize {
        match self {
            Task::Copy(t) => t.one_hot_width(),
            Task::Denoise(t) => t.one_hot_width(),
        }
    }
}

/// Delay for the next training step: `max_delay` itself, or a fresh
/// uniform draw from `[1, max_delay]` in variable-length mode.
pub fn draw_delay<R: Rng + ?Sized>(rng: &mut R, max_delay: usize, variable_length: bool) -> usize {
    if variable_length && max_delay > 1 {
        rng.gen_range(1..=max_delay)
    } else {
        max_delay
    }
}
