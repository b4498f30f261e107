use rand::Rng;

use crate::api::error::{TaskError, TaskResult};
use crate::api::traits::SequenceTask;
use crate::api::types::{Batch, Code, Sample, TaskKind};
use crate::core::symbols::{COPY_ALPHABET, COPY_BLANK_SLOT, COPY_MAX_LABELS, COPY_TRIGGER_SLOT};

/// The copy task: reproduce a short payload after a long blank delay.
///
/// ```text
/// input:  p1 .. pC | blank x (T-1) | trigger | blank x C
/// target: blank x (T + C)                    | p1 .. pC
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyTask {
    labels: usize,
    c_length: usize,
}

impl CopyTask {
    /// `labels` payload symbols (`1..=8`), payload length `c_length`.
    pub fn new(labels: usize, c_length: usize) -> TaskResult<Self> {
        if labels == 0 || labels > COPY_MAX_LABELS {
            return Err(TaskError::InvalidConfig(format!(
                "copy task supports 1..={COPY_MAX_LABELS} labels, got {labels}"
            )));
        }
        Ok(Self { labels, c_length })
    }

    pub fn labels(&self) -> usize {
        self.labels
    }

    pub fn c_length(&self) -> usize {
        self.c_length
    }

    /// Draws the payload as codes from the copy alphabet.
    pub fn draw_payload<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Code> {
        (0..self.c_length)
            .map(|_| COPY_ALPHABET[rng.gen_range(0..self.labels)])
            .collect()
    }

    /// Lays out one sample around an already drawn payload.
    pub fn sample_from_payload(payload: &[Code], delay: usize) -> TaskResult<Sample> {
        if delay == 0 {
            return Err(TaskError::InvalidConfig(
                "copy task delay T must be at least 1".to_string(),
            ));
        }
        let c = payload.len();
        let blank = COPY_ALPHABET[COPY_BLANK_SLOT];
        let trigger = COPY_ALPHABET[COPY_TRIGGER_SLOT];

        let mut input = Vec::with_capacity(delay + 2 * c);
        input.extend_from_slice(payload);
        input.extend(std::iter::repeat(blank).take(delay - 1));
        input.push(trigger);
        input.extend(std::iter::repeat(blank).take(c));

        let mut target = Vec::with_capacity(delay + 2 * c);
        target.extend(std::iter::repeat(blank).take(delay + c));
        target.extend_from_slice(payload);

        Ok(Sample { input, target })
    }

    /// Generates one sample with delay `delay`.
    pub fn generate_sample<R: Rng + ?Sized>(&self, rng: &mut R, delay: usize) -> TaskResult<Sample> {
        let payload = self.draw_payload(rng);
        Self::sample_from_payload(&payload, delay)
    }
}

impl SequenceTask for CopyTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Copy
    }

    fn generate_batch<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        batch_size: usize,
        delay: usize,
    ) -> TaskResult<Batch> {
        let samples = (0..batch_size)
            .map(|_| self.generate_sample(rng, delay))
            .collect::<TaskResult<Vec<_>>>()?;
        Ok(Batch {
            samples,
            delay,
            c_length: self.c_length,
        })
    }

    /// Blank plus the payload codes `1..=labels`.
    fn num_classes(&self) -> usize {
        self.labels + 1
    }

    fn one_hot_width(&self) -> usize {
        COPY_ALPHABET[COPY_TRIGGER_SLOT] + 1
    }
}
