//! Premasked datasets and token-budget batching.
//!
//! Sequences are sorted by length and packed greedily so that
//! `longest_in_batch * batch_size` stays within `toks_per_batch`. A sequence
//! that alone exceeds the budget still gets its own batch.
use crate::converter::SequenceRecord;
use crate::error::{Error, Result};
use itertools::Itertools;

/// Group indices of `lengths` into token-budget batches.
///
/// Groups come out in ascending length order and each group is internally
/// sorted by length (ties by original index). Every index appears exactly once.
pub fn partition_by_token_budget(
    lengths: &[usize],
    toks_per_batch: usize,
    extra_toks_per_seq: usize,
) -> Vec<Vec<usize>> {
    let sizes = lengths
        .iter()
        .enumerate()
        .map(|(i, &len)| (len.saturating_add(extra_toks_per_seq), i))
        .sorted_by_key(|&(len, _)| len);

    let mut batches = Vec::new();
    let mut buf: Vec<usize> = Vec::new();
    let mut max_len = 0;

    for (size, idx) in sizes {
        if size.max(max_len).saturating_mul(buf.len() + 1) > toks_per_batch && !buf.is_empty() {
            batches.push(std::mem::take(&mut buf));
            max_len = 0;
        }
        max_len = max_len.max(size);
        buf.push(idx);
    }
    if !buf.is_empty() {
        batches.push(buf);
    }
    batches
}

/// Parallel columns of labels, clean sequences and their masked variants.
#[derive(Debug, Clone, Default)]
pub struct PremaskedDataset {
    labels: Vec<String>,
    sequences: Vec<String>,
    masked: Vec<String>,
}

impl PremaskedDataset {
    /// Fails with [`Error::ColumnLengthMismatch`] if the three columns differ in length.
    pub fn new(labels: Vec<String>, sequences: Vec<String>, masked: Vec<String>) -> Result<Self> {
        if labels.len() != sequences.len() || sequences.len() != masked.len() {
            return Err(Error::ColumnLengthMismatch {
                labels: labels.len(),
                sequences: sequences.len(),
                masked: masked.len(),
            });
        }
        Ok(Self {
            labels,
            sequences,
            masked,
        })
    }

    pub fn from_records(records: impl IntoIterator<Item = SequenceRecord>) -> Self {
        let mut dataset = Self::default();
        for record in records {
            dataset.labels.push(record.label);
            dataset.sequences.push(record.clean);
            dataset.masked.push(record.perturbed);
        }
        dataset
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<SequenceRecord> {
        Some(SequenceRecord::new(
            self.labels.get(idx)?.as_str(),
            self.sequences.get(idx)?.as_str(),
            self.masked.get(idx)?.as_str(),
        ))
    }

    /// Index groups sized by the character length of the clean sequences.
    pub fn batch_indices(&self, toks_per_batch: usize, extra_toks_per_seq: usize) -> Vec<Vec<usize>> {
        let lengths: Vec<usize> = self.sequences.iter().map(|s| s.chars().count()).collect();
        partition_by_token_budget(&lengths, toks_per_batch, extra_toks_per_seq)
    }

    /// Records for each index group, paired with the original indices.
    pub fn batches(
        &self,
        toks_per_batch: usize,
        extra_toks_per_seq: usize,
    ) -> impl Iterator<Item = (Vec<usize>, Vec<SequenceRecord>)> + '_ {
        self.batch_indices(toks_per_batch, extra_toks_per_seq)
            .into_iter()
            .map(move |indices| {
                let records = indices.iter().filter_map(|&i| self.get(i)).collect();
                (indices, records)
            })
    }
}
