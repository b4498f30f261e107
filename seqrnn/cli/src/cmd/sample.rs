use anyhow::Result;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use seqrnn_tasks::{draw_delay, Code, SequenceTask};

use super::args::ExperimentArgs;

#[derive(Args)]
pub struct SampleArgs {
    #[command(flatten)]
    experiment: ExperimentArgs,

    /// Print the batch as JSON.
    #[arg(long)]
    json: bool,
}

pub fn run(args: SampleArgs) -> Result<()> {
    let config = args.experiment.to_config()?;
    let task = config.task()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let delay = draw_delay(&mut rng, config.t, config.variable_length);
    let batch = task.generate_batch(&mut rng, config.batch, delay)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    println!("Task:          {}", task.kind());
    println!("Delay T:       {}", batch.delay);
    println!("Payload C:     {}", batch.c_length);
    println!("Seq length:    {}", batch.seq_len());
    println!("Recall window: [{}, {})", batch.recall_start(), batch.seq_len());
    for (i, sample) in batch.samples.iter().enumerate() {
        println!();
        println!("[{i}] input:  {}", join(&sample.input));
        println!("[{i}] target: {}", join(&sample.target));
    }
    Ok(())
}

fn join(codes: &[Code]) -> String {
    codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
