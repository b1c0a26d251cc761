//! Splitting raw sequence strings into tokens.
//!
//! The tokenizer walks a list of "no-split" tokens in order and splits the text on
//! each of them, re-inserting the token as a standalone piece. Whatever remains
//! after all no-split tokens have been applied is handed to an elementary
//! splitter (whitespace by default).
//!
//! ```ignore
//! let tokenizer = NoSplitTokenizer::new(["<mask>", "A", "K"]);
//! assert_eq!(tokenizer.tokenize("AK<mask>A"), vec!["A", "K", "<mask>", "A"]);
//! ```
use std::collections::HashSet;

/// Splitting rule applied to text that contains no atomic tokens.
pub trait ElementarySplit {
    fn split<'t>(&self, text: &'t str) -> Vec<&'t str>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceSplit;

impl ElementarySplit for WhitespaceSplit {
    fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        text.split_whitespace().collect()
    }
}

#[derive(Debug, Clone)]
pub struct NoSplitTokenizer<S = WhitespaceSplit> {
    // order matters: earlier tokens are split out first
    no_split_tokens: Vec<String>,
    no_split_set: HashSet<String>,
    splitter: S,
}

impl NoSplitTokenizer<WhitespaceSplit> {
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::with_splitter(tokens, WhitespaceSplit)
    }
}

impl<S: ElementarySplit> NoSplitTokenizer<S> {
    pub fn with_splitter<I, T>(tokens: I, splitter: S) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut no_split_tokens = Vec::new();
        let mut no_split_set = HashSet::new();
        for tok in tokens {
            let tok = tok.into();
            if !tok.is_empty() && no_split_set.insert(tok.clone()) {
                no_split_tokens.push(tok);
            }
        }
        Self {
            no_split_tokens,
            no_split_set,
            splitter,
        }
    }

    pub fn is_no_split(&self, token: &str) -> bool {
        self.no_split_set.contains(token)
    }

    /// Tokenize `text`, keeping every configured token atomic.
    ///
    /// Blank input yields no tokens. Whitespace around an atomic token is
    /// dropped, and adjacent atomic tokens never produce empty pieces.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> Vec<&'a str> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut pieces: Vec<&'a str> = vec![text];
        for tok in &self.no_split_tokens {
            let mut next = Vec::with_capacity(pieces.len());
            for piece in pieces {
                if self.is_no_split(piece) {
                    next.push(piece);
                } else {
                    split_on_token(tok, piece, &mut next);
                }
            }
            pieces = next;
        }

        pieces
            .into_iter()
            .flat_map(|piece| {
                if self.is_no_split(piece) {
                    vec![piece]
                } else {
                    self.splitter.split(piece)
                }
            })
            .collect()
    }
}

/// Split `text` on every occurrence of `tok`, pushing the remainders and the
/// token itself onto `out` in order.
fn split_on_token<'a>(tok: &'a str, text: &'a str, out: &mut Vec<&'a str>) {
    let parts: Vec<&'a str> = text.split(tok).collect();
    let last = parts.len() - 1;
    for (i, part) in parts.into_iter().enumerate() {
        let mut part = part;
        if i < last {
            part = part.trim_end();
        }
        if i > 0 {
            part = part.trim_start();
        }

        if i == 0 && part.is_empty() {
            out.push(tok);
        } else if i == last {
            if !part.is_empty() {
                out.push(part);
            }
        } else {
            if !part.is_empty() {
                out.push(part);
            }
            out.push(tok);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protein_tokenizer() -> NoSplitTokenizer {
        NoSplitTokenizer::new(["<cls>", "<pad>", "<unk>", "M", "K", "V", "<mask>"])
    }

    #[test]
    fn test_blank_input_is_empty() {
        let tokenizer = protein_tokenizer();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   \t\n").is_empty());
    }

    #[test]
    fn test_single_special_token() {
        let tokenizer = protein_tokenizer();
        assert_eq!(tokenizer.tokenize("<mask>"), vec!["<mask>"]);
    }

    #[test]
    fn test_unspaced_residues_split() {
        let tokenizer = protein_tokenizer();
        assert_eq!(tokenizer.tokenize("MKV"), vec!["M", "K", "V"]);
    }

    #[test]
    fn test_adjacent_specials_have_no_empty_pieces() {
        let tokenizer = protein_tokenizer();
        assert_eq!(
            tokenizer.tokenize("<mask><mask>M<cls>"),
            vec!["<mask>", "<mask>", "M", "<cls>"]
        );
    }

    #[test]
    fn test_whitespace_around_specials_dropped() {
        let tokenizer = protein_tokenizer();
        assert_eq!(
            tokenizer.tokenize("M <mask> K"),
            vec!["M", "<mask>", "K"]
        );
    }

    #[test]
    fn test_unknown_chunks_fall_back_to_whitespace_split() {
        let tokenizer = NoSplitTokenizer::new(["<mask>"]);
        assert_eq!(
            tokenizer.tokenize("AB CD<mask>EF"),
            vec!["AB", "CD", "<mask>", "EF"]
        );
    }

    struct CharSplit;

    impl ElementarySplit for CharSplit {
        fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
            text.char_indices()
                .filter(|(_, c)| !c.is_whitespace())
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        }
    }

    #[test]
    fn test_custom_elementary_split() {
        let tokenizer = NoSplitTokenizer::with_splitter(["<mask>"], CharSplit);
        assert_eq!(tokenizer.tokenize("AB<mask>C"), vec!["A", "B", "<mask>", "C"]);
        assert_eq!(tokenizer.tokenize("A B"), vec!["A", "B"]);
    }

    #[test]
    fn test_duplicate_tokens_collapse() {
        let tokenizer = NoSplitTokenizer::new(["M", "M", "<mask>"]);
        assert_eq!(tokenizer.no_split_tokens, vec!["M", "<mask>"]);
    }
}
