use crate::api::types::Code;

/// Loss and recall-window accuracy accumulated over one batch of sequences.
///
/// Loss is summed per time step (each step already averaged over the batch)
/// and divided by the number of steps. Accuracy counts exact matches inside
/// the window `[window_start, window_start + window_len)` and divides by
/// `window_len * batch_size`.
pub struct SequenceMetrics {
    window_start: usize,
    window_len: usize,
    batch_size: usize,
    loss_sum: f64,
    steps: usize,
    correct: usize,
}

impl SequenceMetrics {
    pub fn new(window_start: usize, window_len: usize, batch_size: usize) -> Self {
        Self {
            window_start,
            window_len,
            batch_size,
            loss_sum: 0.0,
            steps: 0,
            correct: 0,
        }
    }

    /// Whether time step `t` is scored for accuracy.
    pub fn in_window(&self, t: usize) -> bool {
        t >= self.window_start && t < self.window_start + self.window_len
    }

    /// Records the batch-mean loss of step `t` and, inside the window, the
    /// number of predictions matching their targets.
    pub fn record(&mut self, t: usize, step_loss: f32, predictions: &[Code], targets: &[Code]) {
        assert_eq!(predictions.len(), targets.len());
        self.loss_sum += step_loss as f64;
        self.steps += 1;
        if self.in_window(t) {
            self.correct += predictions
                .iter()
                .zip(targets)
                .filter(|(p, y)| p == y)
                .count();
        }
    }

    pub fn loss(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        self.loss_sum / self.steps as f64
    }

    /// Returns 0.0 when the window is empty.
    pub fn accuracy(&self) -> f64 {
        let scored = self.window_len * self.batch_size;
        if scored == 0 {
            return 0.0;
        }
        self.correct as f64 / scored as f64
    }

    pub fn reset(&mut self) {
        self.loss_sum = 0.0;
        self.steps = 0;
        self.correct = 0;
    }
}

/// Accuracy of batch-major predicted sequences against their targets over
/// the window `[window_start, window_start + window_len)`.
///
/// Returns 0.0 for an empty window or batch.
pub fn window_accuracy(
    predictions: &[Vec<Code>],
    targets: &[Vec<Code>],
    window_start: usize,
    window_len: usize,
) -> f64 {
    assert_eq!(predictions.len(), targets.len());
    let scored = window_len * predictions.len();
    if scored == 0 {
        return 0.0;
    }
    let window = window_start..window_start + window_len;
    let correct: usize = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| {
            p[window.clone()]
                .iter()
                .zip(&t[window.clone()])
                .filter(|(a, b)| a == b)
                .count()
        })
        .sum();
    correct as f64 / scored as f64
}

/// Running mean of per-batch losses and accuracies, used by evaluation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_accuracy_perfect_on_window() {
        // garbage outside the window does not count
        let target = vec![vec![0, 0, 0, 0, 0, 0, 0, 3, 1]];
        let pred = vec![vec![5, 5, 5, 5, 5, 5, 5, 3, 1]];
        assert_eq!(window_accuracy(&pred, &target, 7, 2), 1.0);
    }

    #[test]
    fn test_window_accuracy_single_mismatch() {
        let c = 4;
        let target = vec![vec![0, 0, 0, 0, 2, 3, 4, 5]];
        let pred = vec![vec![0, 0, 0, 0, 2, 3, 9, 5]];
        let acc = window_accuracy(&pred, &target, 4, c);
        assert!((acc - (c as f64 - 1.0) / c as f64).abs() < 1e-12);
    }

    #[test]
    fn test_window_accuracy_averages_over_batch() {
        let target = vec![vec![0, 1, 2], vec![0, 1, 2]];
        let pred = vec![vec![0, 1, 2], vec![0, 0, 0]];
        assert_eq!(window_accuracy(&pred, &target, 1, 2), 0.5);
    }

    #[test]
    fn test_empty_window() {
        assert_eq!(window_accuracy(&[vec![1]], &[vec![1]], 1, 0), 0.0);
    }

    #[test]
    fn test_sequence_metrics_accumulation() {
        let mut m = SequenceMetrics::new(2, 2, 2);
        m.record(0, 1.0, &[9, 9], &[0, 0]);
        m.record(1, 3.0, &[9, 9], &[0, 0]);
        m.record(2, 2.0, &[1, 2], &[1, 2]);
        m.record(3, 2.0, &[1, 0], &[1, 2]);
        assert_eq!(m.loss(), 2.0);
        assert_eq!(m.accuracy(), 0.75);
        m.reset();
        assert_eq!(m.loss(), 0.0);
        assert_eq!(m.accuracy(), 0.0);
    }

    #[test]
    fn test_running_mean() {
        let mut r = RunningMean::new();
        assert_eq!(r.mean(), 0.0);
        r.update(1.0);
        r.update(0.5);
        assert_eq!(r.mean(), 0.75);
        assert_eq!(r.count(), 2);
    }
}
