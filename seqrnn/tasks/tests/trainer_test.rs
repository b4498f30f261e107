use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use seqrnn_tasks::*;

/// Output logits are a single learned bias row, whatever the input.
struct BiasOnly {
    bias: Matrix,
    grad: Matrix,
    orthogonal_steps: usize,
}

impl BiasOnly {
    fn new(classes: usize) -> Self {
        Self {
            bias: Matrix::zeros(1, classes),
            grad: Matrix::zeros(1, classes),
            orthogonal_steps: 0,
        }
    }
}

impl SequenceModel for BiasOnly {
    fn reset_state(&mut self, _batch_size: usize) {}

    fn forward_step(&mut self, inputs: &[Vec<f32>]) -> TaskResult<Vec<Vec<f32>>> {
        Ok(vec![self.bias.row(0).to_vec(); inputs.len()])
    }

    fn parameters(&self) -> Vec<(&'static str, &Matrix)> {
        vec![("bias", &self.bias)]
    }

    fn parameters_mut(&mut self) -> Vec<(&'static str, &mut Matrix)> {
        vec![("bias", &mut self.bias)]
    }
}

impl Differentiable for BiasOnly {
    fn backward(&mut self, logit_grads: &[Vec<Vec<f32>>]) -> TaskResult<()> {
        let grad = self.grad.as_mut_slice();
        for step in logit_grads {
            for row in step {
                for (g, d) in grad.iter_mut().zip(row) {
                    *g += d;
                }
            }
        }
        Ok(())
    }

    fn gradients_mut(&mut self) -> Vec<&mut Matrix> {
        vec![&mut self.grad]
    }

    fn orthogonal_step(&mut self) -> TaskResult<()> {
        self.orthogonal_steps += 1;
        Ok(())
    }
}

struct Sgd {
    lr: f32,
    updates: usize,
}

impl Optimizer<BiasOnly> for Sgd {
    fn step(&mut self, network: &mut BiasOnly) -> TaskResult<()> {
        let grad = network.grad.clone();
        for (p, g) in network.bias.as_mut_slice().iter_mut().zip(grad.as_slice()) {
            *p -= self.lr * g;
        }
        self.updates += 1;
        Ok(())
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn state(&self) -> serde_json::Value {
        serde_json::json!({ "updates": self.updates })
    }

    fn load_state(&mut self, state: &serde_json::Value) -> TaskResult<()> {
        self.updates = state["updates"].as_u64().unwrap_or(0) as usize;
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Collect(Rc<RefCell<Vec<(String, f64, usize)>>>);

impl ScalarSink for Collect {
    fn add_scalar(&mut self, tag: &str, value: f64, step: usize) -> TaskResult<()> {
        self.0.borrow_mut().push((tag.to_string(), value, step));
        Ok(())
    }
}

fn copy_trainer(steps: usize) -> Trainer<BiasOnly, Sgd, CopyTask> {
    let task = CopyTask::new(8, 5).unwrap();
    let classes = task.num_classes();
    Trainer::new(BiasOnly::new(classes), Sgd { lr: 0.5, updates: 0 }, task, InputEncoding::Scalar)
        .with_batch_size(4)
        .with_delay(20, false)
        .with_steps(steps)
}

#[test]
fn test_loss_decreases_with_bias_model() {
    let mut rng = StdRng::seed_from_u64(400);
    let mut trainer = copy_trainer(50);
    let log = trainer.fit(&mut rng).unwrap();

    assert_eq!(log.len(), 50);
    assert_eq!(log.grad_norms.len(), 50);
    // all-zero logits over 9 classes
    assert!((log.losses[0] - 9f64.ln()).abs() < 1e-4, "{}", log.losses[0]);
    let last = *log.losses.last().unwrap();
    assert!(last < 1.5, "final loss {last} should be well below ln(9)");
    assert_eq!(trainer.optimizer.updates, 50);
    assert_eq!(trainer.network.orthogonal_steps, 50);
}

#[test]
fn test_nan_loss_stops_run() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut trainer = copy_trainer(10);
    trainer.network.bias.fill(f32::NAN);
    let err = trainer.fit(&mut rng).unwrap_err();
    assert!(matches!(err, TaskError::NonFinite { step: 0, what: "loss" }), "{err}");
    assert_eq!(trainer.optimizer.updates, 0);
}

#[test]
fn test_grad_clip_bounds_gradients() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut trainer = copy_trainer(1).with_grad_clip(0.01);
    let stats = trainer.train_step(&mut rng, 0).unwrap();
    assert!(stats.grad_norm > 0.01);
    let clipped = grad_norm(&trainer.network.gradients_mut(), NormType::L2);
    assert!(clipped <= 0.0101, "{clipped}");
}

#[test]
fn test_variable_delay_per_step() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut trainer = copy_trainer(1).with_delay(30, true);
    let delays: Vec<usize> = (0..40)
        .map(|step| trainer.train_step(&mut rng, step).unwrap().delay)
        .collect();
    assert!(delays.iter().all(|d| (1..=30).contains(d)));
    assert!(delays.iter().any(|&d| d != delays[0]));
}

#[test]
fn test_scalars_streamed_to_sink() {
    let mut rng = StdRng::seed_from_u64(4);
    let sink = Collect::default();
    let mut trainer = copy_trainer(3).with_sink(Box::new(sink.clone()));
    trainer.fit(&mut rng).unwrap();

    let records = sink.0.borrow();
    assert_eq!(records.len(), 9);
    assert_eq!(records[0].0, "Loss");
    assert_eq!(records[1].0, "Accuracy");
    assert_eq!(records[2].0, "Grad Norm");
    assert_eq!(records[8].2, 2);
}

#[test]
fn test_logs_and_checkpoint_written_then_resumed() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let mut trainer = copy_trainer(5).with_save_dir(dir.path());
    trainer.fit(&mut rng).unwrap();

    let log = TrainingLog::load(dir.path(), "RNN").unwrap();
    assert_eq!(log.len(), 5);
    let latest = latest_checkpoint(dir.path()).unwrap();
    assert!(latest.ends_with("RNN_5.ckpt.json"));

    let checkpoint = Checkpoint::load(&latest).unwrap();
    assert_eq!(checkpoint.step, 5);
    let mut resumed = copy_trainer(8);
    resumed.resume_from(&checkpoint).unwrap();
    assert_eq!(resumed.start_step(), 5);
    assert_eq!(resumed.optimizer.updates, 5);
    assert_eq!(resumed.network.bias, trainer.network.bias);

    let more = resumed.fit(&mut rng).unwrap();
    assert_eq!(more.len(), 3);
}

#[test]
fn test_from_config() {
    let config = ExperimentConfig {
        t: 12,
        c_length: 3,
        batch: 2,
        steps: Some(4),
        ..ExperimentConfig::denoise_defaults()
    };
    let classes = config.task().unwrap().num_classes();
    let trainer = Trainer::from_config(BiasOnly::new(classes), Sgd { lr: 0.1, updates: 0 }, &config).unwrap();
    assert_eq!(trainer.steps(), 4);
    assert_eq!(trainer.task().kind(), TaskKind::Denoise);

    let bad = ExperimentConfig { device: Device::Cuda, ..config };
    let err = Trainer::from_config(BiasOnly::new(classes), Sgd { lr: 0.1, updates: 0 }, &bad);
    assert!(matches!(err, Err(TaskError::DeviceUnavailable(_))));
}
