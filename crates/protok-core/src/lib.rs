//! protok-core
//!
//! Tokenization and length-aware batching of protein sequences for protein
//! language model inference.
//!
//! - [`Vocabulary`]: architecture-specific token tables, tokenization and encoding.
//! - [`DualBatchConverter`]: `(label, clean, perturbed)` records to two padded id tensors.
//! - [`partition_by_token_budget`] / [`PremaskedDataset`]: greedy token-budget batching.
//! - [`ResidueBudgetStreamer`]: longest-first batching under residue and count limits.
//!
//! ```ignore
//! use protok_core::{SequenceRecord, Vocabulary};
//!
//! let vocab = Vocabulary::from_architecture("ESM-1b")?;
//! let converter = vocab.batch_converter(Some(1022));
//! let batch = converter.convert(&[SequenceRecord::new("p1", "MKTAYIAK", "MKT<mask>YIAK")])?;
//! ```
pub mod config;
pub mod constants;
pub mod converter;
pub mod dataset;
pub mod error;
pub mod preprocess;
pub mod streamer;
pub mod tokenizer;
pub mod vocabulary;

pub use config::BatchingConfig;
pub use converter::{DualBatch, DualBatchConverter, SequenceRecord};
pub use dataset::{partition_by_token_budget, PremaskedDataset};
pub use error::{Error, Result};
pub use preprocess::{mask_sequence, normalize_residues, prostt5_input};
pub use streamer::{
    ResidueBatch, ResidueBatches, ResidueBudget, ResidueBudgetStreamer, SkippedBatch,
    StreamReport,
};
pub use tokenizer::{ElementarySplit, NoSplitTokenizer, WhitespaceSplit};
pub use vocabulary::{Architecture, ArchitectureConfig, Vocabulary};
