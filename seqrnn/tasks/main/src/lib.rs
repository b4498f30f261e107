//! # seqrnn tasks
//!
//! Synthetic long-memory benchmarks for recurrent networks: the copy task
//! and the denoise task, together with the pieces needed to run them.
//!
//! ## Features
//!
//! - Copy and denoise sequence generators with a shared `Batch` layout
//! - Scalar and one-hot input encodings
//! - Orthogonal (Henaff, Cayley, random) and normal (Xavier, Kaiming) initializers
//! - A forward-only Elman cell with linear readout, for evaluation
//! - Recall-window loss and accuracy, gradient-norm measurement and a
//!   training loop over pluggable `Differentiable` / `Optimizer` backends
//! - Run identifiers, hyperparameter dumps, JSON checkpoints and logs
//!
//! ## Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use seqrnn_tasks::{CopyTask, SequenceTask};
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(400);
//! let task = CopyTask::new(8, 10).unwrap();
//! let batch = task.generate_batch(&mut rng, 4, 300).unwrap();
//! assert_eq!(batch.seq_len(), 320);
//! assert_eq!(batch.samples[0].input[309], 9);
//! ```

pub mod api;
mod core;
mod saf;

pub use saf::*;
