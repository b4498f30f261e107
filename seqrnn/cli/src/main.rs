mod cmd;

use anyhow::Result;
use clap::Parser;

/// seqrnn — copy and denoise benchmarks for recurrent networks.
#[derive(Parser)]
#[command(name = "seqrnn", version, about)]
struct Cli {
    #[command(subcommand)]
    command: cmd::Command,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    cmd::run(cli.command)
}
