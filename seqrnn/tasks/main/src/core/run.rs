use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::error::TaskResult;
use crate::api::types::TaskKind;
use crate::core::config::ExperimentConfig;

/// Identifies one run: experiment family, network, hyperparameter key, seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId {
    pub experiment: String,
    pub net_type: String,
    pub key: String,
    pub seed: u64,
}

impl RunId {
    pub fn from_config(config: &ExperimentConfig) -> Self {
        let experiment = match (config.task, config.variable_length) {
            (TaskKind::Copy, false) => "copytask",
            (TaskKind::Copy, true) => "varicopytask",
            (TaskKind::Denoise, _) => "denoisetask",
        };

        let mut key = format!(
            "HS_{}_NL_{}_lr_{}_BS_{}_rinit_{}_iinit_{}_decay_{}",
            config.hidden_size,
            config.nonlin,
            config.lr,
            config.batch,
            config.rinit,
            config.iinit,
            config.weight_decay,
        );
        if config.task == TaskKind::Copy {
            key.push_str(&format!("_alpha_{}", config.alpha));
        }
        if config.onehot {
            key = format!("onehot/{key}");
        }

        Self {
            experiment: experiment.to_string(),
            net_type: config.net_type.clone(),
            key,
            seed: config.seed,
        }
    }

    /// `{experiment}/{net}/{key}/{seed}`, relative to a logs or saves root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.experiment)
            .join(&self.net_type)
            .join(&self.key)
            .join(self.seed.to_string())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.experiment, self.net_type, self.key, self.seed)
    }
}

/// Log and save directories of a run. Building one does not touch the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirs {
    pub logs: PathBuf,
    pub saves: PathBuf,
}

impl RunDirs {
    pub fn new(root: impl AsRef<Path>, run_id: &RunId) -> Self {
        let root = root.as_ref();
        let rel = run_id.relative_path();
        Self {
            logs: root.join("logs").join(&rel),
            saves: root.join("saves").join(&rel),
        }
    }

    /// Creates the save directory and writes `hparams.txt` into it.
    pub fn create(&self, config: &ExperimentConfig) -> TaskResult<PathBuf> {
        fs::create_dir_all(&self.saves)?;
        let hparams = self.saves.join("hparams.txt");
        config.write_hparams(&hparams)?;
        log::info!("run directory ready: {}", self.saves.display());
        Ok(hparams)
    }
}
