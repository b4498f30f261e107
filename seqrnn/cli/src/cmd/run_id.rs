use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use seqrnn_tasks::{RunDirs, RunId};

use super::args::ExperimentArgs;

#[derive(Args)]
pub struct RunIdArgs {
    #[command(flatten)]
    experiment: ExperimentArgs,

    /// Directory holding `logs/` and `saves/`.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Create the save directory and write hparams.txt into it.
    #[arg(long)]
    create: bool,
}

pub fn run(args: RunIdArgs) -> Result<()> {
    let config = args.experiment.to_config()?;
    let run_id = RunId::from_config(&config);
    let dirs = RunDirs::new(&args.root, &run_id);

    println!("Experiment:    {}", run_id.experiment);
    println!("Network:       {}", run_id.net_type);
    println!("Key:           {}", run_id.key);
    println!("Seed:          {}", run_id.seed);
    println!("Steps:         {}", config.steps());
    println!("Logs:          {}", dirs.logs.display());
    println!("Saves:         {}", dirs.saves.display());

    if args.create {
        let hparams = dirs
            .create(&config)
            .with_context(|| format!("Failed to create run directory: {}", dirs.saves.display()))?;
        println!("Hparams:       {}", hparams.display());
    }
    Ok(())
}
