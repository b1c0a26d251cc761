//! Error types for tokenization and batching.

use thiserror::Error;

/// Errors produced while building vocabularies or materializing batches.
///
/// Out-of-vocabulary characters are not represented here: they degrade to the
/// unknown id instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown architecture selected: {0}")]
    UnknownArchitecture(String),

    #[error("token set is missing the `<unk>` token")]
    MissingUnknownToken,

    #[error("cannot convert an empty batch")]
    EmptyBatch,

    #[error(
        "clean encoding for `{label}` has {clean_len} tokens but the batch width only fits {max_len}"
    )]
    CleanSequenceOverflow {
        label: String,
        clean_len: usize,
        max_len: usize,
    },

    #[error(
        "dataset columns differ in length: {labels} labels, {sequences} sequences, {masked} masked"
    )]
    ColumnLengthMismatch {
        labels: usize,
        sequences: usize,
        masked: usize,
    },

    #[error("invalid batching configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, Error>;
