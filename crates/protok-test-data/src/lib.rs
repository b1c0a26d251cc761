//! protok-test-data
//!
//! A module to provide test files embedded in the crate for use in testing.
//!
//! The test files are represented as `TestFile` objects which package the raw binary data
//! and create temporary files for programs to operate on.
use std::fs;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
/// Test File
///
/// Example usage:
///
/// ```ignore
/// // returns (filepath, _tempfile_handle).
/// // _handle ensures the tempfile remains in scope
/// use protok_test_data::TestFile;
/// let (fasta, _temp) = TestFile::proteins_01().create_temp().unwrap();
/// ```
pub struct TestFile {
    filebinary: &'static [u8],
    suffix: &'static str,
}

impl TestFile {
    /// Five proteins of 142, 110, 46, 10 and 10 residues.
    /// The last one carries non-canonical residues (U, Z, O, B).
    pub fn proteins_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/fasta/small_proteins.fasta"),
            suffix: "fasta",
        }
    }
    /// Small A3M alignment with gaps and lower-case insertion columns.
    pub fn alignment_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/fasta/alignment.a3m"),
            suffix: "a3m",
        }
    }
    /// Lower-case 3Di structure string; not valid amino-acid input.
    pub fn three_di_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/fasta/three_di.fasta"),
            suffix: "fasta",
        }
    }
    /// Batching thresholds as JSON.
    pub fn batching_config_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/config/batching.json"),
            suffix: "json",
        }
    }

    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let temp = Builder::new()
            .suffix(&format!(".{}", self.suffix))
            .tempfile()?;

        fs::write(&temp, self.filebinary)?;
        let path = temp.path().to_string_lossy().into_owned();

        Ok((path, temp))
    }
}
