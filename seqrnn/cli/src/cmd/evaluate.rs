use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use seqrnn_tasks::{
    draw_delay, latest_checkpoint, load_checkpoint, model_summary, run_sequence, RecurrentModel,
    RunDirs, RunId, RunningMean, SequenceTask, TaskError,
};

use super::args::ExperimentArgs;

#[derive(Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    experiment: ExperimentArgs,

    /// Number of batches to evaluate.
    #[arg(long, default_value_t = 10)]
    eval_steps: usize,

    /// Checkpoint file, or "latest" for the newest one in the run's save directory.
    #[arg(long, value_name = "PATH|latest")]
    checkpoint: Option<String>,

    /// Directory holding `logs/` and `saves/`.
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

pub fn run(args: EvaluateArgs) -> Result<()> {
    let config = args.experiment.to_config()?;
    if args.eval_steps == 0 {
        bail!("--eval-steps must be at least 1");
    }
    let task = config.task()?;
    let encoding = config.encoding()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut model = RecurrentModel::new(&mut rng, &config.model_spec()?)?;
    println!("{}", model_summary(&model));

    let run_id = RunId::from_config(&config);
    let dirs = RunDirs::new(&args.root, &run_id);
    dirs.create(&config)
        .with_context(|| format!("Failed to create run directory: {}", dirs.saves.display()))?;

    if let Some(which) = &args.checkpoint {
        let path = if which == "latest" {
            latest_checkpoint(&dirs.saves)?
        } else {
            PathBuf::from(which)
        };
        let checkpoint = load_checkpoint(&mut model, &path)
            .with_context(|| format!("Failed to load checkpoint: {}", path.display()))?;
        println!("Loaded checkpoint {} (step {})", path.display(), checkpoint.step);
    }

    let mut loss = RunningMean::new();
    let mut accuracy = RunningMean::new();
    for step in 0..args.eval_steps {
        let delay = draw_delay(&mut rng, config.t, config.variable_length);
        let batch = task.generate_batch(&mut rng, config.batch, delay)?;
        let out = run_sequence(&mut model, &batch, encoding)?;
        if !out.loss.is_finite() {
            return Err(TaskError::NonFinite { step, what: "loss" }.into());
        }
        log::info!(
            "Batch {}, T={}, Loss: {:.6}, Accuracy: {:.4}",
            step + 1,
            delay,
            out.loss,
            out.accuracy,
        );
        loss.update(out.loss);
        accuracy.update(out.accuracy);
    }

    println!("Batches:       {}", loss.count());
    println!("Mean loss:     {:.6}", loss.mean());
    println!("Mean accuracy: {:.4}", accuracy.mean());
    Ok(())
}
