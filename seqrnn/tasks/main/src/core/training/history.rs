use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::error::TaskResult;
use crate::api::traits::ScalarSink;

/// Per-step scalars of a training run, appended once per step and written
/// out in full when the run ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingLog {
    pub losses: Vec<f64>,
    pub accuracies: Vec<f64>,
    pub grad_norms: Vec<f32>,
}

impl TrainingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, loss: f64, accuracy: f64, grad_norm: f32) {
        self.losses.push(loss);
        self.accuracies.push(accuracy);
        self.grad_norms.push(grad_norm);
    }

    pub fn len(&self) -> usize {
        self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    /// Writes `{net}_Train_Losses.json`, `{net}_Train_Accuracy.json` and
    /// `{net}_Grad_Norms.json` into `dir`, returning the three paths.
    pub fn save(&self, dir: impl AsRef<Path>, net_type: &str) -> TaskResult<[PathBuf; 3]> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let losses = dir.join(format!("{net_type}_Train_Losses.json"));
        let accuracies = dir.join(format!("{net_type}_Train_Accuracy.json"));
        let norms = dir.join(format!("{net_type}_Grad_Norms.json"));
        fs::write(&losses, serde_json::to_vec(&self.losses)?)?;
        fs::write(&accuracies, serde_json::to_vec(&self.accuracies)?)?;
        fs::write(&norms, serde_json::to_vec(&self.grad_norms)?)?;
        Ok([losses, accuracies, norms])
    }

    /// Reads back the three files written by [`TrainingLog::save`].
    pub fn load(dir: impl AsRef<Path>, net_type: &str) -> TaskResult<Self> {
        let dir = dir.as_ref();
        let read = |name: String| fs::read(dir.join(name));
        Ok(Self {
            losses: serde_json::from_slice(&read(format!("{net_type}_Train_Losses.json"))?)?,
            accuracies: serde_json::from_slice(&read(format!("{net_type}_Train_Accuracy.json"))?)?,
            grad_norms: serde_json::from_slice(&read(format!("{net_type}_Grad_Norms.json"))?)?,
        })
    }
}

#[derive(Serialize)]
struct ScalarRecord<'a> {
    tag: &'a str,
    value: f64,
    step: usize,
}

/// Appends one JSON object per scalar (`{"tag", "value", "step"}`) to a file.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn create(path: impl AsRef<Path>) -> TaskResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn flush(&mut self) -> TaskResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl ScalarSink for JsonlSink {
    fn add_scalar(&mut self, tag: &str, value: f64, step: usize) -> TaskResult<()> {
        serde_json::to_writer(&mut self.writer, &ScalarRecord { tag, value, step })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("JsonlSink: flush on drop failed: {}", e);
        }
    }
}
