use std::str::FromStr;

use anyhow::Result;
use clap::Args;

use seqrnn_tasks::{
    Device, ExperimentConfig, InputInit, Nonlinearity, NormType, RecurrentInit, TaskError,
    TaskKind,
};

/// Experiment flags shared by every subcommand. Unset flags keep the
/// task's defaults.
#[derive(Args, Debug)]
pub struct ExperimentArgs {
    /// Which benchmark: copy or denoise.
    #[arg(long, value_parser = parse_enum::<TaskKind>)]
    pub task: TaskKind,

    /// Network type.
    #[arg(long)]
    pub net_type: Option<String>,

    /// Hidden state size.
    #[arg(long)]
    pub nhid: Option<usize>,

    /// Run on an accelerator (yes/no).
    #[arg(long, value_parser = parse_bool)]
    pub cuda: Option<bool>,

    /// Delay T (maximum delay with --vari).
    #[arg(long = "T", value_name = "T")]
    pub t: Option<usize>,

    #[arg(long)]
    pub random_seed: Option<u64>,

    /// Number of payload labels.
    #[arg(long)]
    pub labels: Option<usize>,

    /// Payload length C.
    #[arg(long)]
    pub c_length: Option<usize>,

    /// none, relu, tanh, sigmoid or modrelu.
    #[arg(long, value_parser = parse_enum::<Nonlinearity>)]
    pub nonlin: Option<Nonlinearity>,

    /// Redraw T every step (yes/no).
    #[arg(long, value_parser = parse_bool)]
    pub vari: Option<bool>,

    #[arg(long)]
    pub lr: Option<f64>,

    /// henaff, cayley, random, xavier or kaiming.
    #[arg(long, value_parser = parse_enum::<RecurrentInit>)]
    pub rinit: Option<RecurrentInit>,

    /// xavier or kaiming.
    #[arg(long, value_parser = parse_enum::<InputInit>)]
    pub iinit: Option<InputInit>,

    #[arg(long)]
    pub batch: Option<usize>,

    #[arg(long = "weight_decay")]
    pub weight_decay: Option<f64>,

    /// One-hot encode the inputs (yes/no).
    #[arg(long, value_parser = parse_bool)]
    pub onehot: Option<bool>,

    /// RMSProp decay.
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Override the number of training steps.
    #[arg(long)]
    pub steps: Option<usize>,

    /// Bound on the global gradient norm.
    #[arg(long)]
    pub max_grad_norm: Option<f32>,

    /// l2 or inf.
    #[arg(long, value_parser = parse_enum::<NormType>)]
    pub norm_type: Option<NormType>,
}

impl ExperimentArgs {
    /// Task defaults with every given flag applied, validated.
    pub fn to_config(&self) -> Result<ExperimentConfig> {
        let mut config = ExperimentConfig::for_task(self.task);
        if let Some(net_type) = &self.net_type {
            config.net_type = net_type.clone();
        }
        if let Some(cuda) = self.cuda {
            config.device = if cuda { Device::Cuda } else { Device::Cpu };
        }
        override_with(&mut config.hidden_size, self.nhid);
        override_with(&mut config.t, self.t);
        override_with(&mut config.seed, self.random_seed);
        override_with(&mut config.labels, self.labels);
        override_with(&mut config.c_length, self.c_length);
        override_with(&mut config.nonlin, self.nonlin);
        override_with(&mut config.variable_length, self.vari);
        override_with(&mut config.lr, self.lr);
        override_with(&mut config.rinit, self.rinit);
        override_with(&mut config.iinit, self.iinit);
        override_with(&mut config.batch, self.batch);
        override_with(&mut config.weight_decay, self.weight_decay);
        override_with(&mut config.onehot, self.onehot);
        override_with(&mut config.alpha, self.alpha);
        override_with(&mut config.norm_type, self.norm_type);
        if self.steps.is_some() {
            config.steps = self.steps;
        }
        if self.max_grad_norm.is_some() {
            config.max_grad_norm = self.max_grad_norm;
        }
        config.validate()?;
        Ok(config)
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn parse_enum<T: FromStr<Err = TaskError>>(s: &str) -> Result<T, String> {
    s.parse().map_err(|e: TaskError| e.to_string())
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err(format!("boolean value expected, got '{s}'")),
    }
}
