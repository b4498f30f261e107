use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::api::error::{TaskError, TaskResult};
use crate::api::traits::SequenceModel;
use crate::api::types::Matrix;

const CHECKPOINT_SUFFIX: &str = ".ckpt.json";

/// A saved training state: named parameters, the optimizer's opaque state
/// and the number of completed steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub params: Vec<SavedParam>,
    pub optimizer: serde_json::Value,
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedParam {
    pub name: String,
    pub shape: [usize; 2],
    pub data: Vec<f32>,
}

impl Checkpoint {
    /// Snapshot a model's current parameters.
    pub fn from_model<M: SequenceModel + ?Sized>(
        model: &M,
        optimizer: serde_json::Value,
        step: usize,
    ) -> Self {
        let params = model
            .parameters()
            .into_iter()
            .map(|(name, p)| SavedParam {
                name: name.to_string(),
                shape: p.shape(),
                data: p.as_slice().to_vec(),
            })
            .collect();
        Checkpoint { params, optimizer, step }
    }

    /// `{net}_{step}.ckpt.json`
    pub fn file_name(net_type: &str, step: usize) -> String {
        format!("{net_type}_{step}{CHECKPOINT_SUFFIX}")
    }

    pub fn save(&self, path: impl AsRef<Path>) -> TaskResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec(self)?)?;
        log::debug!("saved checkpoint (step {}) to {}", self.step, path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> TaskResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            TaskError::Checkpoint(format!("cannot read '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            TaskError::Checkpoint(format!("malformed checkpoint '{}': {e}", path.display()))
        })
    }

    /// Copy the saved parameters into `model`. Names and shapes must match
    /// the model's parameters one to one, in order.
    pub fn load_into_model<M: SequenceModel + ?Sized>(&self, model: &mut M) -> TaskResult<()> {
        let mut params = model.parameters_mut();
        if params.len() != self.params.len() {
            return Err(TaskError::Checkpoint(format!(
                "checkpoint has {} params, model has {}",
                self.params.len(),
                params.len()
            )));
        }
        for ((name, param), saved) in params.iter_mut().zip(&self.params) {
            if *name != saved.name {
                return Err(TaskError::Checkpoint(format!(
                    "parameter name mismatch: model '{name}', checkpoint '{}'",
                    saved.name
                )));
            }
            if param.shape() != saved.shape {
                return Err(TaskError::ShapeMismatch {
                    expected: param.shape().to_vec(),
                    got: saved.shape.to_vec(),
                });
            }
            **param = Matrix::from_vec(saved.shape[0], saved.shape[1], saved.data.clone())?;
        }
        Ok(())
    }
}

/// Most recently modified `*.ckpt.json` file in `dir`.
pub fn latest_checkpoint(dir: impl AsRef<Path>) -> TaskResult<PathBuf> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| {
        TaskError::Checkpoint(format!("cannot list '{}': {e}", dir.display()))
    })?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_checkpoint = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(CHECKPOINT_SUFFIX));
        if !is_checkpoint {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| TaskError::Checkpoint(format!("no checkpoint found in '{}'", dir.display())))
}

/// Load the checkpoint at `path` into `model`.
pub fn load_checkpoint<M: SequenceModel + ?Sized>(
    model: &mut M,
    path: impl AsRef<Path>,
) -> TaskResult<Checkpoint> {
    let checkpoint = Checkpoint::load(path)?;
    checkpoint.load_into_model(model)?;
    Ok(checkpoint)
}
