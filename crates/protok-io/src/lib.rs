//! protok-io
//!
//! Reading protein sequence records from FASTA-style files.
pub mod fasta;

pub use fasta::{
    parse_fasta, parse_sequence_map, read_fasta, read_sequence_map, FastaOptions, FastaRecord,
};
