//! protok
//!
//! ```shell
//! protok tokenize --input proteins.fasta --output batches.safetensors --mask-fraction 0.15
//! protok stream --input proteins.fasta --output plan.json --max-residues 4000
//! ```
use clap::Parser;
mod cli;
mod commands;
mod device;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);
    cli.execute()?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
