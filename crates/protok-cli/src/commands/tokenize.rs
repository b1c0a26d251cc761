//! `protok tokenize`
//!
//! FASTA -> masked copies -> token-budget batches -> padded clean/perturbed
//! tensors. Tensors are stored as `clean.<i>` / `perturbed.<i>` in one
//! safetensors file; labels and original indices go to a JSON sidecar.
use crate::cli::TokenizeArgs;
use crate::device::device;
use anyhow::{Context, Result};
use candle_core::{Device, Tensor};
use protok_core::{mask_sequence, PremaskedDataset, SequenceRecord, Vocabulary};
use protok_io::{read_fasta, FastaOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;

#[derive(Debug, Serialize)]
struct BatchEntry {
    batch: usize,
    indices: Vec<usize>,
    labels: Vec<String>,
    shape: (usize, usize),
}

#[derive(Debug, Serialize)]
struct Sidecar {
    architecture: String,
    padding_idx: u32,
    batches: Vec<BatchEntry>,
}

pub fn execute(args: TokenizeArgs) -> Result<()> {
    let config = args.batching.resolve()?;
    let vocab = Vocabulary::from_architecture(&args.arch)?;
    let records = read_fasta(&args.input, FastaOptions::default())?;
    tracing::info!("Total number of sequences: {}", records.len());

    let mut rng = StdRng::seed_from_u64(args.seed);
    let dataset = PremaskedDataset::from_records(records.into_iter().map(|r| {
        let masked = mask_sequence(&r.sequence, args.mask_fraction, &mut rng);
        SequenceRecord::new(r.id, r.sequence, masked)
    }));

    let converter = vocab
        .batch_converter(config.truncation_seq_length)
        .with_device(device(args.cpu)?);

    let mut tensors: HashMap<String, Tensor> = HashMap::new();
    let mut batches = Vec::new();
    for (i, (indices, records)) in dataset
        .batches(config.toks_per_batch, config.extra_toks_per_seq)
        .enumerate()
    {
        let batch = converter
            .convert(&records)
            .with_context(|| format!("failed to convert batch {i}"))?;
        let shape = batch.clean.dims2()?;
        tracing::debug!(batch = i, rows = shape.0, width = shape.1, "tokenized batch");

        let (labels, clean, perturbed) = batch.into_parts();
        tensors.insert(format!("clean.{i}"), clean.to_device(&Device::Cpu)?);
        tensors.insert(format!("perturbed.{i}"), perturbed.to_device(&Device::Cpu)?);
        batches.push(BatchEntry {
            batch: i,
            indices,
            labels,
            shape,
        });
    }

    candle_core::safetensors::save(&tensors, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    let sidecar_path = args.output.with_extension("json");
    let sidecar = Sidecar {
        architecture: args.arch.clone(),
        padding_idx: converter.vocab().padding_idx,
        batches,
    };
    serde_json::to_writer_pretty(File::create(&sidecar_path)?, &sidecar)?;

    tracing::info!(
        "Finished writing {} batches to {} ({})",
        sidecar.batches.len(),
        args.output.display(),
        sidecar_path.display()
    );
    Ok(())
}
