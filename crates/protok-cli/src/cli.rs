use super::commands;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use protok_core::BatchingConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Thresholds loaded from `--config` and overridden by individual flags.
#[derive(Args, Debug, Clone, Default)]
pub struct BatchingArgs {
    /// JSON file with batching thresholds
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub toks_per_batch: Option<usize>,

    #[arg(long)]
    pub extra_toks_per_seq: Option<usize>,

    #[arg(long)]
    pub truncation_seq_length: Option<usize>,

    #[arg(long)]
    pub max_residues: Option<usize>,

    #[arg(long)]
    pub max_seq_len: Option<usize>,

    #[arg(long)]
    pub max_batch: Option<usize>,
}

impl BatchingArgs {
    pub fn resolve(&self) -> Result<BatchingConfig> {
        let mut config = match &self.config {
            Some(path) => BatchingConfig::from_json_file(path)?,
            None => BatchingConfig::default(),
        };
        if let Some(v) = self.toks_per_batch {
            config.toks_per_batch = v;
        }
        if let Some(v) = self.extra_toks_per_seq {
            config.extra_toks_per_seq = v;
        }
        if let Some(v) = self.truncation_seq_length {
            config.truncation_seq_length = Some(v);
        }
        if let Some(v) = self.max_residues {
            config.max_residues = v;
        }
        if let Some(v) = self.max_seq_len {
            config.max_seq_len = v;
        }
        if let Some(v) = self.max_batch {
            config.max_batch = v;
        }
        Ok(config.validated()?)
    }
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("`{s}` is not in [0, 1]"))
    }
}

#[derive(Args, Debug)]
pub struct TokenizeArgs {
    /// Input FASTA file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output safetensors file; labels go to a `.json` file next to it
    #[arg(short, long)]
    pub output: PathBuf,

    /// Token layout, e.g. `ESM-1`, `ESM-1b`, `MSA Transformer`
    #[arg(long, default_value = "ESM-1b")]
    pub arch: String,

    /// Probability of replacing each residue with `<mask>` in the perturbed copy
    #[arg(long, default_value_t = 0.0, value_parser = parse_fraction)]
    pub mask_fraction: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Build tensors on the CPU even when a GPU is available
    #[arg(long)]
    pub cpu: bool,

    #[command(flatten)]
    pub batching: BatchingArgs,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Input FASTA file (amino acids, upper case)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output JSON with per-sequence results and skipped batches
    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long, default_value = "ESM-1b")]
    pub arch: String,

    #[command(flatten)]
    pub batching: BatchingArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Group sequences under a token budget and write padded clean/perturbed tensors
    Tokenize(TokenizeArgs),
    /// Stream sequences longest-first under residue and batch-size limits
    Stream(StreamArgs),
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Tokenize(args) => commands::tokenize::execute(args),
            Commands::Stream(args) => commands::stream::execute(args),
        }
    }
}
