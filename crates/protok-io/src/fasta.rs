//! FASTA parsing.
//!
//! Two readers are provided:
//!
//! - [`read_fasta`]: alignment-style reader with gap / insertion / case options.
//! - [`read_sequence_map`]: identifier to amino-acid sequence, rejecting
//!   lower-case (3Di) input.
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub sequence: String,
}

impl FastaRecord {
    pub fn into_pair(self) -> (String, String) {
        (self.id, self.sequence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastaOptions {
    /// Keep `-` gap characters.
    pub keep_gaps: bool,
    /// Keep lower-case insertion columns.
    pub keep_insertions: bool,
    pub to_upper: bool,
}

impl Default for FastaOptions {
    fn default() -> Self {
        Self {
            keep_gaps: true,
            keep_insertions: true,
            to_upper: false,
        }
    }
}

impl FastaOptions {
    fn apply(&self, sequence: String) -> String {
        let mut sequence = sequence;
        if !self.keep_gaps {
            sequence.retain(|c| c != '-');
        }
        if !self.keep_insertions {
            sequence.retain(|c| !c.is_ascii_lowercase());
        }
        if self.to_upper {
            sequence = sequence.to_uppercase();
        }
        sequence
    }
}

// Newline-delimited lines without the trailing `\r`.
struct Lines<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        // `\n` is ASCII, so the match index is always a char boundary
        let (line, advance) = match memchr::memchr(b'\n', rest.as_bytes()) {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }
}

fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    Lines { text, pos: 0 }
        .enumerate()
        .map(|(n, line)| (n + 1, line))
}

pub fn parse_fasta(text: &str, options: FastaOptions) -> Result<Vec<FastaRecord>> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for (n, line) in lines(text) {
        if line.starts_with('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }
            current = Some(FastaRecord {
                id: line.trim().trim_start_matches('>').to_string(),
                sequence: String::new(),
            });
        } else if let Some(record) = current.as_mut() {
            record.sequence.push_str(line.trim());
        } else if !line.trim().is_empty() {
            bail!("line {n}: sequence data before the first header");
        }
    }
    records.extend(current);

    Ok(records
        .into_iter()
        .map(|r| FastaRecord {
            id: r.id,
            sequence: options.apply(r.sequence),
        })
        .collect())
}

pub fn read_fasta<P: AsRef<Path>>(path: P, options: FastaOptions) -> Result<Vec<FastaRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records = parse_fasta(&text, options)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = records.len(), "read fasta");
    Ok(records)
}

fn is_lowercase_only(s: &str) -> bool {
    s.chars().any(char::is_lowercase) && !s.chars().any(char::is_uppercase)
}

/// Identifier to amino-acid sequence, in first-seen order.
///
/// Whitespace and `-` are removed from sequence lines. A sequence line that is
/// entirely lower case is rejected: that is 3Di input, not amino acids. A
/// repeated identifier restarts its sequence but keeps its first position.
pub fn parse_sequence_map(text: &str) -> Result<Vec<FastaRecord>> {
    let mut records: Vec<FastaRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut current: Option<usize> = None;

    for (n, line) in lines(text) {
        if let Some(header) = line.strip_prefix('>') {
            let id = header.trim().to_string();
            let idx = match positions.get(&id) {
                Some(&idx) => {
                    records[idx].sequence.clear();
                    idx
                }
                None => {
                    positions.insert(id.clone(), records.len());
                    records.push(FastaRecord {
                        id,
                        sequence: String::new(),
                    });
                    records.len() - 1
                }
            };
            current = Some(idx);
            continue;
        }

        let residues: String = line
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if is_lowercase_only(&residues) {
            bail!(
                "line {n}: lower-case sequence looks like 3Di input; only amino-acid (upper-case) input is supported"
            );
        }
        match current {
            Some(idx) => records[idx].sequence.push_str(&residues),
            None if residues.is_empty() => {}
            None => bail!("line {n}: sequence data before the first header"),
        }
    }
    Ok(records)
}

pub fn read_sequence_map<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_sequence_map(&text).with_context(|| format!("failed to parse {}", path.display()))
}
