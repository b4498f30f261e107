//! Core types shared by the sequence tasks, the recurrent model and the trainer

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::error::{TaskError, TaskResult};

/// A symbol code. Payload symbols and reserved codes share this space.
pub type Code = usize;

/// Device the experiment runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    Cuda,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
        }
    }
}

/// Which benchmark a configuration drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Copy,
    Denoise,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Copy => "copy",
            TaskKind::Denoise => "denoise",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = TaskError;

    fn from_str(s: &str) -> TaskResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "copy" | "copytask" => Ok(TaskKind::Copy),
            "denoise" | "denoisetask" => Ok(TaskKind::Denoise),
            other => Err(TaskError::InvalidConfig(format!(
                "unknown task '{other}' (expected copy or denoise)"
            ))),
        }
    }
}

/// Hidden-state nonlinearity of the recurrent cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nonlinearity {
    None,
    Relu,
    Tanh,
    Sigmoid,
    /// `sign(z) * relu(|z| + b)` with a learned per-unit threshold `b`.
    ModRelu,
}

impl Nonlinearity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nonlinearity::None => "none",
            Nonlinearity::Relu => "relu",
            Nonlinearity::Tanh => "tanh",
            Nonlinearity::Sigmoid => "sigmoid",
            Nonlinearity::ModRelu => "modrelu",
        }
    }
}

impl fmt::Display for Nonlinearity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Nonlinearity {
    type Err = TaskError;

    fn from_str(s: &str) -> TaskResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Nonlinearity::None),
            "relu" => Ok(Nonlinearity::Relu),
            "tanh" => Ok(Nonlinearity::Tanh),
            "sigmoid" => Ok(Nonlinearity::Sigmoid),
            "modrelu" => Ok(Nonlinearity::ModRelu),
            other => Err(TaskError::InvalidConfig(format!(
                "unknown nonlinearity '{other}' (expected none, relu, tanh, sigmoid or modrelu)"
            ))),
        }
    }
}

/// Initializer for the hidden-to-hidden weight matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrentInit {
    /// Rotation blocks `exp(A)` of a random block-diagonal skew-symmetric `A`.
    Henaff,
    /// Cayley transform `(I + A)^-1 (I - A)` of a random skew-symmetric `A`.
    Cayley,
    /// Q factor of a Gaussian matrix.
    Random,
    Xavier,
    Kaiming,
}

impl RecurrentInit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrentInit::Henaff => "henaff",
            RecurrentInit::Cayley => "cayley",
            RecurrentInit::Random => "random",
            RecurrentInit::Xavier => "xavier",
            RecurrentInit::Kaiming => "kaiming",
        }
    }

    /// Whether the initializer yields an orthogonal matrix.
    pub fn is_orthogonal(&self) -> bool {
        matches!(
            self,
            RecurrentInit::Henaff | RecurrentInit::Cayley | RecurrentInit::Random
        )
    }
}

impl fmt::Display for RecurrentInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrentInit {
    type Err = TaskError;

    fn from_str(s: &str) -> TaskResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "henaff" => Ok(RecurrentInit::Henaff),
            "cayley" => Ok(RecurrentInit::Cayley),
            "random" => Ok(RecurrentInit::Random),
            "xavier" => Ok(RecurrentInit::Xavier),
            "kaiming" => Ok(RecurrentInit::Kaiming),
            other => Err(TaskError::InvalidConfig(format!(
                "unknown recurrent initializer '{other}' (expected henaff, cayley, random, xavier or kaiming)"
            ))),
        }
    }
}

/// Initializer for the input-to-hidden weight matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputInit {
    Xavier,
    Kaiming,
}

impl InputInit {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputInit::Xavier => "xavier",
            InputInit::Kaiming => "kaiming",
        }
    }
}

impl fmt::Display for InputInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputInit {
    type Err = TaskError;

    fn from_str(s: &str) -> TaskResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xavier" => Ok(InputInit::Xavier),
            "kaiming" => Ok(InputInit::Kaiming),
            other => Err(TaskError::InvalidConfig(format!(
                "unknown input initializer '{other}' (expected xavier or kaiming)"
            ))),
        }
    }
}

/// How one time step of input symbols is fed to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputEncoding {
    /// The raw code as a single feature.
    Scalar,
    /// A one-hot vector of the given width.
    OneHot { width: usize },
}

impl InputEncoding {
    /// Number of features per time step.
    pub fn input_size(&self) -> usize {
        match self {
            InputEncoding::Scalar => 1,
            InputEncoding::OneHot { width } => *width,
        }
    }
}

/// Norm used when measuring and bounding the global gradient norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormType {
    #[default]
    L2,
    Inf,
}

impl FromStr for NormType {
    type Err = TaskError;

    fn from_str(s: &str) -> TaskResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "l2" | "2" => Ok(NormType::L2),
            "inf" | "linf" => Ok(NormType::Inf),
            other => Err(TaskError::InvalidConfig(format!(
                "unknown norm '{other}' (expected l2 or inf)"
            ))),
        }
    }
}

/// Dense row-major `f32` matrix.
///
/// Parameters, their gradients and initializer outputs all use this type.
/// Bias vectors are stored as `1 x n` matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> TaskResult<Self> {
        if data.len() != rows * cols {
            return Err(TaskError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![data.len()],
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|v| *v = value);
    }
}

/// One generated sequence pair. Both sequences have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub input: Vec<Code>,
    pub target: Vec<Code>,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

/// A batch of samples sharing the same delay and payload length.
///
/// Stored batch-major; [`Batch::inputs_at`] and [`Batch::targets_at`] give
/// the time-major view the recurrent model consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub samples: Vec<Sample>,
    /// Delay `T` used for every sample in the batch.
    pub delay: usize,
    /// Payload length `C`.
    pub c_length: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of time steps, `T + 2C`.
    pub fn seq_len(&self) -> usize {
        self.delay + 2 * self.c_length
    }

    /// First time step of the recall window, `T + C`.
    pub fn recall_start(&self) -> usize {
        self.delay + self.c_length
    }

    pub fn inputs_at(&self, t: usize) -> Vec<Code> {
        self.samples.iter().map(|s| s.input[t]).collect()
    }

    pub fn targets_at(&self, t: usize) -> Vec<Code> {
        self.samples.iter().map(|s| s.target[t]).collect()
    }
}
