//! Numeric thresholds shared by the partitioners and the converter.
use crate::error::{Error, Result};
use crate::streamer::ResidueBudget;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Batching thresholds.
///
/// ```ignore
/// let cfg = BatchingConfig::builder().toks_per_batch(8192).build();
/// let cfg: BatchingConfig = BatchingConfig::from_json_str(r#"{"max_batch": 64}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder, Validate)]
#[serde(default)]
pub struct BatchingConfig {
    #[builder(default = 4096)]
    #[validate(range(min = 1))]
    pub toks_per_batch: usize,
    #[builder(default)]
    pub extra_toks_per_seq: usize,
    #[validate(range(min = 1))]
    pub truncation_seq_length: Option<usize>,
    #[builder(default = 4000)]
    #[validate(range(min = 1))]
    pub max_residues: usize,
    #[builder(default = 4000)]
    #[validate(range(min = 1))]
    pub max_seq_len: usize,
    #[builder(default = 500)]
    #[validate(range(min = 1))]
    pub max_batch: usize,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BatchingConfig {
    pub fn validated(self) -> Result<Self> {
        self.validate()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(self)
    }

    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::InvalidConfig(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn residue_budget(&self) -> ResidueBudget {
        ResidueBudget {
            max_residues: self.max_residues,
            max_seq_len: self.max_seq_len,
            max_batch: self.max_batch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = BatchingConfig::default();
        assert_eq!(cfg.toks_per_batch, 4096);
        assert_eq!(cfg.extra_toks_per_seq, 0);
        assert_eq!(cfg.truncation_seq_length, None);
        assert_eq!(cfg.residue_budget(), ResidueBudget::default());
    }

    #[test]
    fn test_partial_json_keeps_defaults() -> Result<()> {
        let cfg = BatchingConfig::from_json_str(r#"{"max_batch": 64, "truncation_seq_length": 1022}"#)?;
        assert_eq!(cfg.max_batch, 64);
        assert_eq!(cfg.truncation_seq_length, Some(1022));
        assert_eq!(cfg.max_residues, 4000);
        Ok(())
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        let err = BatchingConfig::from_json_str(r#"{"toks_per_batch": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        let err = BatchingConfig::builder()
            .truncation_seq_length(0)
            .build()
            .validated()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
