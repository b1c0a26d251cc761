//! Residue-Budget Streamer
//!
//! Groups sequences for embedding extraction under three limits: total
//! residues per batch, number of sequences per batch and a per-sequence
//! length ceiling. Sequences are visited longest first so that a batch that
//! exhausts device memory does so at the start of a run.
//!
//! A batch whose processor fails is logged and skipped; its identifiers are
//! simply absent from [`StreamReport::results`].
use crate::preprocess::{normalize_residues, prostt5_input};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueBudget {
    pub max_residues: usize,
    pub max_seq_len: usize,
    pub max_batch: usize,
}

impl Default for ResidueBudget {
    fn default() -> Self {
        Self {
            max_residues: 4000,
            max_seq_len: 4000,
            max_batch: 500,
        }
    }
}

/// A flushed group of sequences, longest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidueBatch {
    pub ids: Vec<String>,
    pub sequences: Vec<String>,
    /// `<AA2fold>`-prefixed, space-separated residues, one per sequence.
    pub inputs: Vec<String>,
    pub lengths: Vec<usize>,
    /// Record whose admission flushed this batch.
    pub trigger_id: String,
    pub trigger_len: usize,
}

impl ResidueBatch {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn total_residues(&self) -> usize {
        self.lengths.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, usize)> {
        self.ids
            .iter()
            .zip(&self.sequences)
            .zip(&self.lengths)
            .map(|((id, seq), &len)| (id.as_str(), seq.as_str(), len))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBatch {
    pub index: usize,
    pub ids: Vec<String>,
    pub trigger_id: String,
    pub trigger_len: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct StreamReport<T> {
    pub results: HashMap<String, T>,
    pub skipped: Vec<SkippedBatch>,
}

struct Entry {
    id: String,
    sequence: String,
    input: String,
    len: usize,
}

/// Lazily flushes batches from a length-sorted queue.
pub struct ResidueBatches {
    entries: std::vec::IntoIter<Entry>,
    total: usize,
    seen: usize,
    budget: ResidueBudget,
}

impl Iterator for ResidueBatches {
    type Item = ResidueBatch;

    fn next(&mut self) -> Option<ResidueBatch> {
        let mut buf: Vec<Entry> = Vec::new();
        for entry in self.entries.by_ref() {
            self.seen += 1;
            let len = entry.len;
            let id = entry.id.clone();
            buf.push(entry);

            // the candidate is already in `buf` and counted a second time here
            let n_res_batch = buf.iter().map(|e| e.len).sum::<usize>() + len;
            if buf.len() >= self.budget.max_batch
                || n_res_batch >= self.budget.max_residues
                || self.seen == self.total
                || len > self.budget.max_seq_len
            {
                let (ids, sequences, inputs, lengths): (
                    Vec<String>,
                    Vec<String>,
                    Vec<String>,
                    Vec<usize>,
                ) = buf
                    .into_iter()
                    .map(|e| (e.id, e.sequence, e.input, e.len))
                    .multiunzip();
                return Some(ResidueBatch {
                    ids,
                    sequences,
                    inputs,
                    lengths,
                    trigger_id: id,
                    trigger_len: len,
                });
            }
        }
        None
    }
}

pub struct ResidueBudgetStreamer {
    budget: ResidueBudget,
    normalize: bool,
}

impl ResidueBudgetStreamer {
    pub fn new(budget: ResidueBudget) -> Self {
        Self {
            budget,
            normalize: true,
        }
    }

    /// Keep sequences verbatim instead of folding non-canonical residues into `X`.
    pub fn without_normalization(mut self) -> Self {
        self.normalize = false;
        self
    }

    pub fn budget(&self) -> ResidueBudget {
        self.budget
    }

    /// Sort `records` longest first and return the batch iterator.
    pub fn batches<I, K, S>(&self, records: I) -> ResidueBatches
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: AsRef<str>,
    {
        let entries: Vec<Entry> = records
            .into_iter()
            .map(|(id, seq)| {
                let sequence = if self.normalize {
                    normalize_residues(seq.as_ref())
                } else {
                    seq.as_ref().to_string()
                };
                let len = sequence.chars().count();
                Entry {
                    id: id.into(),
                    input: prostt5_input(&sequence),
                    sequence,
                    len,
                }
            })
            .sorted_by(|a, b| b.len.cmp(&a.len))
            .collect();
        ResidueBatches {
            total: entries.len(),
            entries: entries.into_iter(),
            seen: 0,
            budget: self.budget,
        }
    }

    pub fn plan<I, K, S>(&self, records: I) -> Vec<ResidueBatch>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: AsRef<str>,
    {
        self.batches(records).collect()
    }

    /// Hand every batch to `processor` as soon as it is flushed.
    ///
    /// A failing batch is recorded in [`StreamReport::skipped`] and the run
    /// continues with the next one. Nothing is retried.
    pub fn run<I, K, S, T, E, F>(&self, records: I, mut processor: F) -> StreamReport<T>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: AsRef<str>,
        E: Display,
        F: FnMut(&ResidueBatch) -> Result<Vec<(String, T)>, E>,
    {
        let mut report = StreamReport {
            results: HashMap::new(),
            skipped: Vec::new(),
        };

        for (index, batch) in self.batches(records).enumerate() {
            tracing::debug!(
                index,
                size = batch.len(),
                residues = batch.total_residues(),
                "processing residue batch"
            );
            match processor(&batch) {
                Ok(outputs) => report.results.extend(outputs),
                Err(err) => {
                    tracing::warn!(
                        "error during embedding for {} (L={}): {}",
                        batch.trigger_id,
                        batch.trigger_len,
                        err
                    );
                    report.skipped.push(SkippedBatch {
                        index,
                        ids: batch.ids,
                        trigger_id: batch.trigger_id,
                        trigger_len: batch.trigger_len,
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            processed = report.results.len(),
            skipped_batches = report.skipped.len(),
            "residue streaming finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(lengths: &[usize]) -> Vec<(String, String)> {
        lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| (format!("seq{i}"), "A".repeat(len)))
            .collect()
    }

    #[test]
    fn test_long_sequence_flushes_alone() {
        let streamer = ResidueBudgetStreamer::new(ResidueBudget::default());
        assert_eq!(streamer.budget().max_batch, 500);
        let plan = streamer.plan(records(&[4000, 100, 100, 100]));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].ids, vec!["seq0"]);
        assert_eq!(plan[1].ids, vec!["seq1", "seq2", "seq3"]);
        assert_eq!(plan[1].trigger_id, "seq3");
    }

    #[test]
    fn test_descending_order_and_max_batch() {
        let budget = ResidueBudget {
            max_residues: 1_000,
            max_seq_len: 1_000,
            max_batch: 2,
        };
        let plan = ResidueBudgetStreamer::new(budget).plan(records(&[1, 5, 3, 4, 2]));
        let lengths: Vec<Vec<usize>> = plan.iter().map(|b| b.lengths.clone()).collect();
        assert_eq!(lengths, vec![vec![5, 4], vec![3, 2], vec![1]]);
    }

    #[test]
    fn test_over_ceiling_sequence_closes_its_batch() {
        let budget = ResidueBudget {
            max_residues: 1_000,
            max_seq_len: 10,
            max_batch: 100,
        };
        let plan = ResidueBudgetStreamer::new(budget).plan(records(&[20, 12, 5, 5]));
        let lengths: Vec<Vec<usize>> = plan.iter().map(|b| b.lengths.clone()).collect();
        assert_eq!(lengths, vec![vec![20], vec![12], vec![5, 5]]);
    }

    #[test]
    fn test_normalization_applies_before_measuring() {
        let streamer = ResidueBudgetStreamer::new(ResidueBudget::default());
        let plan = streamer.plan(vec![("a", "MKU*")]);
        assert_eq!(plan[0].sequences, vec!["MKXX"]);

        let streamer = ResidueBudgetStreamer::new(ResidueBudget::default()).without_normalization();
        let plan = streamer.plan(vec![("a", "MKU*")]);
        assert_eq!(plan[0].sequences, vec!["MKU*"]);
    }

    #[test]
    fn test_batches_carry_prefixed_inputs() {
        let streamer = ResidueBudgetStreamer::new(ResidueBudget::default());
        let plan = streamer.plan(vec![("short", "MK"), ("long", "MKUV")]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].ids, vec!["long", "short"]);
        assert_eq!(plan[0].inputs, vec!["<AA2fold> M K X V", "<AA2fold> M K"]);
        assert_eq!(plan[0].lengths, vec![4, 2]);
    }

    #[test]
    fn test_failed_batch_is_skipped() {
        let budget = ResidueBudget {
            max_residues: 1_000,
            max_seq_len: 1_000,
            max_batch: 1,
        };
        let streamer = ResidueBudgetStreamer::new(budget);
        let report = streamer.run(records(&[30, 20, 10]), |batch| {
            if batch.trigger_len == 20 {
                Err("out of memory")
            } else {
                Ok(batch
                    .iter()
                    .map(|(id, _, len)| (id.to_string(), len))
                    .collect())
            }
        });
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results["seq0"], 30);
        assert!(!report.results.contains_key("seq1"));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].ids, vec!["seq1"]);
        assert_eq!(report.skipped[0].reason, "out of memory");
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let streamer = ResidueBudgetStreamer::new(ResidueBudget::default());
        assert!(streamer.plan(Vec::<(String, String)>::new()).is_empty());
    }
}
