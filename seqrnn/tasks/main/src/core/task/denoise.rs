use rand::seq::index;
use rand::Rng;

use crate::api::error::{TaskError, TaskResult};
use crate::api::traits::SequenceTask;
use crate::api::types::{Batch, Code, Sample, TaskKind};
use crate::core::symbols::Symbol;

/// The denoise task: payload symbols are scattered over the first
/// `T + C - 1` slots and must be recalled in draw order after the marker.
///
/// The target holds the payload in the order it was drawn, not the order the
/// scattered copies appear in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenoiseTask {
    labels: usize,
    c_length: usize,
}

impl DenoiseTask {
    /// Payload codes are drawn from `1..labels`, so `labels` must be in
    /// `2..=10` to keep them clear of the marker.
    pub fn new(labels: usize, c_length: usize) -> TaskResult<Self> {
        let max_labels = Symbol::Marker.code();
        if labels < 2 || labels > max_labels {
            return Err(TaskError::InvalidConfig(format!(
                "denoise task supports 2..={max_labels} labels, got {labels}"
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

    pub fn draw_payload<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Code> {
        (0..self.c_length)
            .map(|_| rng.gen_range(1..self.labels))
            .collect()
    }

    /// Chooses `c_length` distinct slots among the first `delay + c_length - 1`,
    /// sorted ascending.
    pub fn draw_positions<R: Rng + ?Sized>(&self, rng: &mut R, delay: usize) -> TaskResult<Vec<usize>> {
        if delay == 0 {
            return Err(TaskError::InvalidConfig(
                "denoise task delay T must be at least 1".to_string(),
            ));
        }
        let slots = delay + self.c_length - 1;
        let mut positions = index::sample(rng, slots, self.c_length).into_vec();
        positions.sort_unstable();
        Ok(positions)
    }

    /// Lays out one sample: `payload[i]` goes to `positions[i]`.
    pub fn sample_from_parts(payload: &[Code], positions: &[usize], delay: usize) -> TaskResult<Sample> {
        if payload.len() != positions.len() {
            return Err(TaskError::ShapeMismatch {
                expected: vec![payload.len()],
                got: vec![positions.len()],
            });
        }
        let c = payload.len();
        let blank = Symbol::Blank.code();
        let noisy_len = (delay + c).checked_sub(1).ok_or_else(|| {
            TaskError::InvalidConfig("denoise task delay T must be at least 1".to_string())
        })?;

        let mut input = vec![blank; noisy_len];
        for (&pos, &code) in positions.iter().zip(payload) {
            if pos >= noisy_len {
                return Err(TaskError::InvalidConfig(format!(
                    "payload position {pos} outside the first {noisy_len} slots"
                )));
            }
            input[pos] = code;
        }
        input.push(Symbol::Marker.code());
        input.extend(std::iter::repeat(blank).take(c));

        let mut target = vec![blank; delay + c];
        target.extend_from_slice(payload);

        Ok(Sample { input, target })
    }

    pub fn generate_sample<R: Rng + ?Sized>(&self, rng: &mut R, delay: usize) -> TaskResult<Sample> {
        let payload = self.draw_payload(rng);
        let positions = self.draw_positions(rng, delay)?;
        Self::sample_from_parts(&payload, &positions, delay)
    }
}

impl SequenceTask for DenoiseTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Denoise
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

    fn num_classes(&self) -> usize {
        self.labels + 1
    }

    fn one_hot_width(&self) -> usize {
        Symbol::Marker.code() + 1
    }
}
