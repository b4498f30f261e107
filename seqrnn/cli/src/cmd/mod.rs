pub mod args;
pub mod evaluate;
pub mod run_id;
pub mod sample;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// Generate and print one batch of a task.
    Sample(sample::SampleArgs),

    /// Print the run identifier and its log/save directories.
    RunId(run_id::RunIdArgs),

    /// Run a freshly initialized or checkpointed network forward over
    /// generated batches and report loss and accuracy.
    Evaluate(evaluate::EvaluateArgs),
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Sample(args) => sample::run(args),
        Command::RunId(args) => run_id::run(args),
        Command::Evaluate(args) => evaluate::run(args),
    }
}
