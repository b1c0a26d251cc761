//! `protok stream`
//!
//! Runs the residue-budget streamer over a FASTA file, encoding each batch
//! through the dual converter. Sequences of a failed batch are reported
//! under `skipped` and left out of `results`.
use crate::cli::StreamArgs;
use anyhow::Result;
use protok_core::{ResidueBudgetStreamer, SequenceRecord, SkippedBatch, Vocabulary};
use protok_io::{read_sequence_map, FastaRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;

#[derive(Debug, Serialize)]
struct StreamEntry {
    batch: usize,
    length: usize,
    width: usize,
}

#[derive(Debug, Serialize)]
struct StreamOutput {
    results: BTreeMap<String, StreamEntry>,
    skipped: Vec<SkippedBatch>,
}

pub fn execute(args: StreamArgs) -> Result<()> {
    let config = args.batching.resolve()?;
    let vocab = Vocabulary::from_architecture(&args.arch)?;
    let records = read_sequence_map(&args.input)?;
    tracing::info!("Total number of sequences: {}", records.len());

    let converter = vocab.batch_converter(config.truncation_seq_length);
    let streamer = ResidueBudgetStreamer::new(config.residue_budget());
    let budget = streamer.budget();
    tracing::info!(
        max_residues = budget.max_residues,
        max_seq_len = budget.max_seq_len,
        max_batch = budget.max_batch,
        "streaming with residue budget"
    );

    let mut batch_index = 0;
    let report = streamer.run(
        records.into_iter().map(FastaRecord::into_pair),
        |batch| -> protok_core::Result<Vec<(String, StreamEntry)>> {
            let index = batch_index;
            batch_index += 1;

            let inputs: Vec<SequenceRecord> = batch
                .iter()
                .map(|(id, seq, _)| SequenceRecord::unperturbed(id, seq))
                .collect();
            let width = converter.convert(&inputs)?.width()?;
            Ok(batch
                .iter()
                .map(|(id, _, length)| {
                    (
                        id.to_string(),
                        StreamEntry {
                            batch: index,
                            length,
                            width,
                        },
                    )
                })
                .collect())
        },
    );

    let output = StreamOutput {
        results: report.results.into_iter().collect(),
        skipped: report.skipped,
    };
    serde_json::to_writer_pretty(File::create(&args.output)?, &output)?;
    tracing::info!(
        "Finished writing {} results ({} skipped batches) to {}",
        output.results.len(),
        output.skipped.len(),
        args.output.display()
    );
    Ok(())
}
