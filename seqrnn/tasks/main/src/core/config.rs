use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::error::{TaskError, TaskResult};
use crate::api::traits::SequenceTask;
use crate::api::types::{
    Device, InputEncoding, InputInit, Nonlinearity, NormType, RecurrentInit, TaskKind,
};
use crate::core::nn::elman::ModelSpec;
use crate::core::task::{CopyTask, DenoiseTask, Task};

/// Step count of a fixed-length copy-task run.
pub const COPY_STEPS: usize = 1500;
/// Step count of variable-length copy runs and of denoise runs.
pub const LONG_RUN_STEPS: usize = 200_000;

/// Network types the experiments know how to build.
pub const SUPPORTED_NETS: &[&str] = &["RNN"];

/// Everything one experiment run is parameterized by.
///
/// Built once (defaults per task, then overrides) and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub task: TaskKind,
    pub net_type: String,
    pub hidden_size: usize,
    pub device: Device,
    /// Delay `T` (maximum delay in variable-length mode).
    pub t: usize,
    pub seed: u64,
    pub labels: usize,
    pub c_length: usize,
    pub nonlin: Nonlinearity,
    pub variable_length: bool,
    pub lr: f64,
    pub rinit: RecurrentInit,
    pub iinit: InputInit,
    pub batch: usize,
    pub weight_decay: f64,
    pub onehot: bool,
    pub alpha: f64,
    /// Overrides the derived step count.
    pub steps: Option<usize>,
    pub max_grad_norm: Option<f32>,
    pub norm_type: NormType,
}

impl ExperimentConfig {
    pub fn for_task(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Copy => Self::copy_defaults(),
            TaskKind::Denoise => Self::denoise_defaults(),
        }
    }

    pub fn copy_defaults() -> Self {
        Self {
            task: TaskKind::Copy,
            net_type: "RNN".to_string(),
            hidden_size: 128,
            device: Device::Cpu,
            t: 300,
            seed: 400,
            labels: 8,
            c_length: 10,
            nonlin: Nonlinearity::ModRelu,
            variable_length: false,
            lr: 2e-4,
            rinit: RecurrentInit::Henaff,
            iinit: InputInit::Xavier,
            batch: 10,
            weight_decay: 0.0,
            onehot: false,
            alpha: 0.99,
            steps: None,
            max_grad_norm: None,
            norm_type: NormType::L2,
        }
    }

    pub fn denoise_defaults() -> Self {
        Self {
            task: TaskKind::Denoise,
            t: 200,
            labels: 9,
            iinit: InputInit::Kaiming,
            ..Self::copy_defaults()
        }
    }

    /// Rejects configurations no run could start from.
    pub fn validate(&self) -> TaskResult<()> {
        if !SUPPORTED_NETS.contains(&self.net_type.as_str()) {
            return Err(TaskError::InvalidConfig(format!(
                "unsupported net type '{}' (expected one of {:?})",
                self.net_type, SUPPORTED_NETS
            )));
        }
        if self.t == 0 {
            return Err(TaskError::InvalidConfig("T must be at least 1".into()));
        }
        if self.batch == 0 {
            return Err(TaskError::InvalidConfig("batch size must be at least 1".into()));
        }
        if self.hidden_size == 0 {
            return Err(TaskError::InvalidConfig("nhid must be at least 1".into()));
        }
        if !(self.lr > 0.0 && self.lr.is_finite()) {
            return Err(TaskError::InvalidConfig(format!("lr must be positive, got {}", self.lr)));
        }
        if self.weight_decay < 0.0 {
            return Err(TaskError::InvalidConfig(format!(
                "weight decay must be non-negative, got {}",
                self.weight_decay
            )));
        }
        if !(0.0..1.0).contains(&self.alpha) {
            return Err(TaskError::InvalidConfig(format!(
                "alpha must be in [0, 1), got {}",
                self.alpha
            )));
        }
        if let Some(max_norm) = self.max_grad_norm {
            if !(max_norm > 0.0) {
                return Err(TaskError::InvalidConfig(format!(
                    "max grad norm must be positive, got {max_norm}"
                )));
            }
        }
        if self.device == Device::Cuda {
            return Err(TaskError::DeviceUnavailable(
                "cuda requested but only cpu execution is available".into(),
            ));
        }
        self.task()?;
        Ok(())
    }

    /// Number of training steps, honoring the `steps` override.
    pub fn steps(&self) -> usize {
        self.steps.unwrap_or(match (self.task, self.variable_length) {
            (TaskKind::Copy, false) => COPY_STEPS,
            _ => LONG_RUN_STEPS,
        })
    }

    pub fn task(&self) -> TaskResult<Task> {
        Ok(match self.task {
            TaskKind::Copy => Task::Copy(CopyTask::new(self.labels, self.c_length)?),
            TaskKind::Denoise => Task::Denoise(DenoiseTask::new(self.labels, self.c_length)?),
        })
    }

    pub fn encoding(&self) -> TaskResult<InputEncoding> {
        if self.onehot {
            Ok(InputEncoding::OneHot {
                width: self.task()?.one_hot_width(),
            })
        } else {
            Ok(InputEncoding::Scalar)
        }
    }

    pub fn model_spec(&self) -> TaskResult<ModelSpec> {
        let task = self.task()?;
        Ok(ModelSpec {
            input_size: self.encoding()?.input_size(),
            hidden_size: self.hidden_size,
            num_classes: task.num_classes(),
            nonlin: self.nonlin,
            rinit: self.rinit,
            iinit: self.iinit,
        })
    }

    /// Writes every field as a `key: value` line.
    pub fn write_hparams(&self, path: impl AsRef<Path>) -> TaskResult<()> {
        let value = serde_json::to_value(self)?;
        let mut out = String::new();
        if let serde_json::Value::Object(map) = value {
            for (key, v) in map {
                let rendered = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                out.push_str(&format!("{key}: {rendered}\n"));
            }
        }
        fs::write(path, out)?;
        Ok(())
    }
}
