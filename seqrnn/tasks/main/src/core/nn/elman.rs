use rand::Rng;

use crate::api::error::{TaskError, TaskResult};
use crate::api::traits::SequenceModel;
use crate::api::types::{InputInit, Matrix, Nonlinearity, RecurrentInit};
use crate::core::nn::init::uniform_matrix;
use crate::core::nn::linear::Linear;

const BIAS_INIT_BOUND: f32 = 0.01;

/// Shape and initialization choices for a [`RecurrentModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub input_size: usize,
    pub hidden_size: usize,
    pub num_classes: usize,
    pub nonlin: Nonlinearity,
    pub rinit: RecurrentInit,
    pub iinit: InputInit,
}

/// Elman recurrent cell: `h' = sigma(V x + U h, b)`.
///
/// `V` is `[hidden, input]`, `U` is `[hidden, hidden]`, `b` is the per-unit
/// bias (the modReLU threshold when `sigma` is modReLU). The hidden state
/// starts at zero after every [`ElmanCell::reset_state`].
#[derive(Debug, Clone)]
pub struct ElmanCell {
    input_weight: Matrix,
    recurrent_weight: Matrix,
    bias: Matrix,
    nonlin: Nonlinearity,
    hidden: Vec<Vec<f32>>,
}

impl ElmanCell {
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        input_size: usize,
        hidden_size: usize,
        nonlin: Nonlinearity,
        rinit: RecurrentInit,
        iinit: InputInit,
    ) -> TaskResult<Self> {
        if hidden_size == 0 || input_size == 0 {
            return Err(TaskError::InvalidConfig(format!(
                "recurrent cell needs positive sizes, got input={input_size} hidden={hidden_size}"
            )));
        }
        let input_weight = iinit.init(rng, hidden_size, input_size)?;
        let recurrent_weight = rinit.init(rng, hidden_size)?;
        let bias = uniform_matrix(rng, 1, hidden_size, BIAS_INIT_BOUND);
        log::debug!(
            "ElmanCell: input={} hidden={} nonlin={} rinit={} iinit={}",
            input_size,
            hidden_size,
            nonlin,
            rinit,
            iinit,
        );
        Ok(Self {
            input_weight,
            recurrent_weight,
            bias,
            nonlin,
            hidden: Vec::new(),
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_weight.cols()
    }

    pub fn hidden_size(&self) -> usize {
        self.recurrent_weight.rows()
    }

    pub fn recurrent_weight(&self) -> &Matrix {
        &self.recurrent_weight
    }

    pub fn reset_state(&mut self, batch_size: usize) {
        self.hidden = vec![vec![0.0; self.hidden_size()]; batch_size];
    }

    /// Current hidden state, `[batch][hidden]`.
    pub fn hidden(&self) -> &[Vec<f32>] {
        &self.hidden
    }

    /// Advances every batch element by one step and returns the new hidden state.
    pub fn step(&mut self, inputs: &[Vec<f32>]) -> TaskResult<&[Vec<f32>]> {
        if inputs.len() != self.hidden.len() {
            return Err(TaskError::ShapeMismatch {
                expected: vec![self.hidden.len()],
                got: vec![inputs.len()],
            });
        }
        for (x, h) in inputs.iter().zip(self.hidden.iter_mut()) {
            let mut z = self.input_weight.matvec(x)?;
            let recurrent = self.recurrent_weight.matvec(h)?;
            z.iter_mut().zip(&recurrent).for_each(|(a, &r)| *a += r);
            self.nonlin.apply(&mut z, self.bias.as_slice())?;
            *h = z;
        }
        Ok(&self.hidden)
    }
}

/// An Elman cell followed by a linear readout to class logits.
///
/// Forward-only: the crate does not compute gradients for it. It is used to
/// evaluate freshly initialized or checkpointed networks.
#[derive(Debug, Clone)]
pub struct RecurrentModel {
    cell: ElmanCell,
    readout: Linear,
}

impl RecurrentModel {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, spec: &ModelSpec) -> TaskResult<Self> {
        let cell = ElmanCell::new(
            rng,
            spec.input_size,
            spec.hidden_size,
            spec.nonlin,
            spec.rinit,
            spec.iinit,
        )?;
        let readout = Linear::new(rng, spec.hidden_size, spec.num_classes)?;
        Ok(Self { cell, readout })
    }

    pub fn cell(&self) -> &ElmanCell {
        &self.cell
    }

    pub fn readout(&self) -> &Linear {
        &self.readout
    }
}

impl SequenceModel for RecurrentModel {
    fn reset_state(&mut self, batch_size: usize) {
        self.cell.reset_state(batch_size);
    }

    fn forward_step(&mut self, inputs: &[Vec<f32>]) -> TaskResult<Vec<Vec<f32>>> {
        let hidden = self.cell.step(inputs)?;
        hidden.iter().map(|h| self.readout.forward(h)).collect()
    }

    fn parameters(&self) -> Vec<(&'static str, &Matrix)> {
        vec![
            ("input_weight", &self.cell.input_weight),
            ("recurrent_weight", &self.cell.recurrent_weight),
            ("bias", &self.cell.bias),
            ("readout_weight", self.readout.weight()),
            ("readout_bias", self.readout.bias()),
        ]
    }

    fn parameters_mut(&mut self) -> Vec<(&'static str, &mut Matrix)> {
        let [readout_weight, readout_bias] = self.readout.parameters_mut();
        vec![
            ("input_weight", &mut self.cell.input_weight),
            ("recurrent_weight", &mut self.cell.recurrent_weight),
            ("bias", &mut self.cell.bias),
            ("readout_weight", readout_weight),
            ("readout_bias", readout_bias),
        ]
    }
}
