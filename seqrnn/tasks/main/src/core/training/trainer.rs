use std::path::PathBuf;
use std::time::Instant;

use rand::Rng;

use crate::api::error::{TaskError, TaskResult};
use crate::api::traits::{Differentiable, Optimizer, ScalarSink, SequenceTask};
use crate::api::types::{InputEncoding, NormType};
use crate::core::checkpoint::Checkpoint;
use crate::core::config::ExperimentConfig;
use crate::core::task::{draw_delay, Task};
use crate::core::training::forward::run_sequence;
use crate::core::training::grad_clip::clip_grad_norm;
use crate::core::training::history::TrainingLog;

/// Scalars produced by one training step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStats {
    pub step: usize,
    pub delay: usize,
    pub loss: f64,
    pub accuracy: f64,
    /// Global gradient norm before any clipping.
    pub grad_norm: f32,
}

pub struct Trainer<N, O, T> {
    pub network: N,
    pub optimizer: O,
    task: T,
    encoding: InputEncoding,
    batch_size: usize,
    max_delay: usize,
    variable_length: bool,
    steps: usize,
    start_step: usize,
    max_grad_norm: Option<f32>,
    norm_type: NormType,
    net_type: String,
    save_dir: Option<PathBuf>,
    sink: Option<Box<dyn ScalarSink>>,
}

impl<N, O> Trainer<N, O, Task>
where
    N: Differentiable,
    O: Optimizer<N>,
{
    /// A trainer set up from a validated configuration.
    pub fn from_config(network: N, optimizer: O, config: &ExperimentConfig) -> TaskResult<Self> {
        config.validate()?;
        let mut trainer = Trainer::new(network, optimizer, config.task()?, config.encoding()?)
            .with_batch_size(config.batch)
            .with_delay(config.t, config.variable_length)
            .with_steps(config.steps())
            .with_norm_type(config.norm_type)
            .with_net_type(config.net_type.clone());
        if let Some(max_norm) = config.max_grad_norm {
            trainer = trainer.with_grad_clip(max_norm);
        }
        Ok(trainer)
    }
}

impl<N, O, T> Trainer<N, O, T>
where
    N: Differentiable,
    O: Optimizer<N>,
    T: SequenceTask,
{
    pub fn new(network: N, optimizer: O, task: T, encoding: InputEncoding) -> Self {
        Self {
            network,
            optimizer,
            task,
            encoding,
            batch_size: 10,
            max_delay: 1,
            variable_length: false,
            steps: 1,
            start_step: 0,
            max_grad_norm: None,
            norm_type: NormType::L2,
            net_type: "RNN".to_string(),
            save_dir: None,
            sink: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Delay `T`; with `variable_length` it becomes the upper bound of a
    /// fresh draw every step.
    pub fn with_delay(mut self, max_delay: usize, variable_length: bool) -> Self {
        self.max_delay = max_delay;
        self.variable_length = variable_length;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Bound the global gradient norm. Without a bound the norm is only measured.
    pub fn with_grad_clip(mut self, max_norm: f32) -> Self {
        self.max_grad_norm = Some(max_norm);
        self
    }

    pub fn with_norm_type(mut self, norm_type: NormType) -> Self {
        self.norm_type = norm_type;
        self
    }

    pub fn with_net_type(mut self, net_type: impl Into<String>) -> Self {
        self.net_type = net_type.into();
        self
    }

    /// Directory that receives the logs and the final checkpoint.
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = Some(dir.into());
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn ScalarSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn start_step(&self) -> usize {
        self.start_step
    }

    /// Continue from a checkpoint: restores parameters and optimizer state
    /// and skips the steps it already covers.
    pub fn resume_from(&mut self, checkpoint: &Checkpoint) -> TaskResult<()> {
        checkpoint.load_into_model(&mut self.network)?;
        self.optimizer.load_state(&checkpoint.optimizer)?;
        self.start_step = checkpoint.step;
        log::info!("resuming from step {}", checkpoint.step);
        Ok(())
    }

    /// One update: draw a batch, run it forward, backpropagate, measure (and
    /// optionally bound) the gradient norm, then step the optimizer.
    pub fn train_step<R: Rng + ?Sized>(&mut self, rng: &mut R, step: usize) -> TaskResult<StepStats> {
        let delay = draw_delay(rng, self.max_delay, self.variable_length);
        let batch = self.task.generate_batch(rng, self.batch_size, delay)?;

        self.network.zero_grad();
        let out = run_sequence(&mut self.network, &batch, self.encoding)?;
        if !out.loss.is_finite() {
            return Err(TaskError::NonFinite { step, what: "loss" });
        }

        self.network.backward(&out.logit_grads)?;

        let grad_norm = {
            let mut grads = self.network.gradients_mut();
            clip_grad_norm(&mut grads, self.max_grad_norm, self.norm_type)
        };
        if !grad_norm.is_finite() {
            return Err(TaskError::NonFinite { step, what: "gradient norm" });
        }

        self.network.orthogonal_step()?;
        self.optimizer.step(&mut self.network)?;

        Ok(StepStats {
            step,
            delay,
            loss: out.loss,
            accuracy: out.accuracy,
            grad_norm,
        })
    }

    /// Runs every remaining step, returning the per-step log.
    ///
    /// When a save directory is configured the three log files and a final
    /// checkpoint are written there after the last step.
    pub fn fit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TaskResult<TrainingLog> {
        let mut history = TrainingLog::new();

        for step in self.start_step..self.steps {
            let started = Instant::now();
            let stats = self.train_step(rng, step)?;

            log::info!(
                "Update {}, Time for Update: {:.3}s, Average Loss: {:.6}, Accuracy: {:.4}",
                step + 1,
                started.elapsed().as_secs_f64(),
                stats.loss,
                stats.accuracy,
            );
            log::debug!("Update {}: T={}, grad norm={:.6}", step + 1, stats.delay, stats.grad_norm);

            history.push(stats.loss, stats.accuracy, stats.grad_norm);
            if let Some(sink) = self.sink.as_mut() {
                sink.add_scalar("Loss", stats.loss, step)?;
                sink.add_scalar("Accuracy", stats.accuracy, step)?;
                sink.add_scalar("Grad Norm", stats.grad_norm as f64, step)?;
            }
        }

        if let Some(dir) = &self.save_dir {
            history.save(dir, &self.net_type)?;
            let checkpoint = Checkpoint::from_model(&self.network, self.optimizer.state(), self.steps);
            let path = dir.join(Checkpoint::file_name(&self.net_type, self.steps));
            checkpoint.save(&path)?;
            log::info!("saved logs and checkpoint to {}", dir.display());
        }

        Ok(history)
    }
}
