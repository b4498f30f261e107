// SAF (Simple API Facade) — re-exports for convenient access

// API traits and types
pub use crate::api::error::{TaskError, TaskResult};
pub use crate::api::traits::{Differentiable, Optimizer, ScalarSink, SequenceModel, SequenceTask};
pub use crate::api::types::{
    Batch, Code, Device, InputEncoding, InputInit, Matrix, Nonlinearity, NormType, RecurrentInit,
    Sample, TaskKind,
};

// Symbols and tasks
pub use crate::core::symbols::{
    Symbol, COPY_ALPHABET, COPY_BLANK_SLOT, COPY_MAX_LABELS, COPY_TRIGGER_SLOT,
};
pub use crate::core::task::{draw_delay, CopyTask, DenoiseTask, Task};

// Linear algebra and initializers
pub use crate::core::linalg::{cayley_transform, orthogonality_error, orthonormalize, skew_error, solve};
pub use crate::core::nn::init::{
    cayley_init, cayley_skew, exp_skew_blocks, henaff_init, henaff_skew, kaiming_normal,
    random_orthogonal_init, skew_from_blocks, uniform_matrix, xavier_normal,
};

// Model
pub use crate::core::nn::elman::{ElmanCell, ModelSpec, RecurrentModel};
pub use crate::core::nn::linear::Linear;
pub use crate::core::nn::summary::model_summary;

// Training
pub use crate::core::training::forward::{run_sequence, SequenceOutput};
pub use crate::core::training::grad_clip::{clip_grad_norm, grad_norm};
pub use crate::core::training::history::{JsonlSink, TrainingLog};
pub use crate::core::training::loss::{argmax, cross_entropy, StepLoss};
pub use crate::core::training::metrics::{window_accuracy, RunningMean, SequenceMetrics};
pub use crate::core::training::trainer::{StepStats, Trainer};

// Run bookkeeping
pub use crate::core::checkpoint::{latest_checkpoint, load_checkpoint, Checkpoint, SavedParam};
pub use crate::core::config::{ExperimentConfig, COPY_STEPS, LONG_RUN_STEPS, SUPPORTED_NETS};
pub use crate::core::run::{RunDirs, RunId};
