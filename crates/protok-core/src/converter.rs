//! Dual Batch Converter
//!
//! Turns a batch of `(label, clean, perturbed)` records into two padded id
//! matrices of identical shape. The width is driven by the perturbed column
//! only; the perturbed column is also the only one that gets truncated.
use crate::error::{Error, Result};
use crate::vocabulary::Vocabulary;
use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

/// One sequence with its unmodified and perturbed (masked) variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub label: String,
    pub clean: String,
    pub perturbed: String,
}

impl SequenceRecord {
    pub fn new(
        label: impl Into<String>,
        clean: impl Into<String>,
        perturbed: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            clean: clean.into(),
            perturbed: perturbed.into(),
        }
    }

    /// A record whose perturbed variant is the clean sequence itself.
    pub fn unperturbed(label: impl Into<String>, sequence: impl Into<String>) -> Self {
        let sequence = sequence.into();
        Self::new(label, sequence.clone(), sequence)
    }
}

/// Output of [`DualBatchConverter::convert`]. Row `i` of both tensors belongs to `labels[i]`.
#[derive(Debug, Clone)]
pub struct DualBatch {
    pub labels: Vec<String>,
    /// `(batch, width)` ids of the clean sequences, `i64`.
    pub clean: Tensor,
    /// `(batch, width)` ids of the perturbed sequences, `i64`.
    pub perturbed: Tensor,
}

impl DualBatch {
    pub fn into_parts(self) -> (Vec<String>, Tensor, Tensor) {
        (self.labels, self.clean, self.perturbed)
    }

    pub fn width(&self) -> Result<usize> {
        Ok(self.perturbed.dims2()?.1)
    }
}

pub struct DualBatchConverter<'v> {
    vocab: &'v Vocabulary,
    truncation_seq_length: Option<usize>,
    device: Device,
}

impl<'v> DualBatchConverter<'v> {
    pub fn new(vocab: &'v Vocabulary, truncation_seq_length: Option<usize>) -> Self {
        Self {
            vocab,
            truncation_seq_length,
            device: Device::Cpu,
        }
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn vocab(&self) -> &Vocabulary {
        self.vocab
    }

    /// Encode and pad a batch. Input order is preserved row for row.
    ///
    /// Fails with [`Error::CleanSequenceOverflow`] when a clean encoding is
    /// longer than the (possibly truncated) longest perturbed encoding, since
    /// it would not fit the allocated width.
    pub fn convert<'r, I>(&self, batch: I) -> Result<DualBatch>
    where
        I: IntoIterator<Item = &'r SequenceRecord>,
    {
        let records: Vec<&SequenceRecord> = batch.into_iter().collect();
        if records.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let mut perturbed_ids: Vec<Vec<u32>> = records
            .iter()
            .map(|r| self.vocab.encode(&r.perturbed))
            .collect();
        let clean_ids: Vec<Vec<u32>> = records
            .iter()
            .map(|r| self.vocab.encode(&r.clean))
            .collect();

        if let Some(limit) = self.truncation_seq_length {
            for ids in perturbed_ids.iter_mut() {
                ids.truncate(limit);
            }
        }

        let max_len = perturbed_ids.iter().map(Vec::len).max().unwrap_or(0);
        let width =
            max_len + usize::from(self.vocab.prepend_bos) + usize::from(self.vocab.append_eos);
        let batch_size = records.len();

        let pad = i64::from(self.vocab.padding_idx);
        let mut clean = vec![pad; batch_size * width];
        let mut perturbed = vec![pad; batch_size * width];

        for (i, record) in records.iter().enumerate() {
            if clean_ids[i].len() > max_len {
                return Err(Error::CleanSequenceOverflow {
                    label: record.label.clone(),
                    clean_len: clean_ids[i].len(),
                    max_len,
                });
            }
            let row = i * width..(i + 1) * width;
            self.write_row(&mut clean[row.clone()], &clean_ids[i]);
            self.write_row(&mut perturbed[row], &perturbed_ids[i]);
        }

        tracing::debug!(batch_size, width, "converted dual batch");

        Ok(DualBatch {
            labels: records.iter().map(|r| r.label.clone()).collect(),
            clean: Tensor::from_vec(clean, (batch_size, width), &self.device)?,
            perturbed: Tensor::from_vec(perturbed, (batch_size, width), &self.device)?,
        })
    }

    fn write_row(&self, row: &mut [i64], ids: &[u32]) {
        let offset = usize::from(self.vocab.prepend_bos);
        if self.vocab.prepend_bos {
            row[0] = i64::from(self.vocab.cls_idx);
        }
        for (cell, &id) in row[offset..offset + ids.len()].iter_mut().zip(ids) {
            *cell = i64::from(id);
        }
        if self.vocab.append_eos {
            row[offset + ids.len()] = i64::from(self.vocab.eos_idx);
        }
    }
}
