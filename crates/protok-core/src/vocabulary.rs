//! Token vocabularies for protein language model architectures.
//!
//! A [`Vocabulary`] is built once per architecture and is read-only afterwards.
//! Wrap it in an `Arc` to share it between converters or threads.
//!
//! Layout of the id space:
//!
//! ```text
//! prepend_tokens ++ standard_tokens ++ <null_1>.. (pad to multiple of 8) ++ append_tokens
//! ```
use crate::constants::{
    ALL_SPECIAL_TOKENS, CLS_TOKEN, EOS_TOKEN, MASK_TOKEN, PAD_TOKEN, PROTEINSEQ_TOKS, UNK_TOKEN,
    VOCAB_ALIGNMENT,
};
use crate::converter::DualBatchConverter;
use crate::error::{Error, Result};
use crate::tokenizer::NoSplitTokenizer;
use std::collections::HashMap;
use strum::{Display, EnumIter};

/// Model families with a known token layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Architecture {
    #[strum(serialize = "ESM-1")]
    Esm1,
    #[strum(serialize = "ESM-1b")]
    Esm1b,
    #[strum(serialize = "MSA Transformer")]
    MsaTransformer,
    #[strum(serialize = "invariant_gvp")]
    InvariantGvp,
}

/// Token-set configuration selected by an [`Architecture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitectureConfig {
    pub standard_tokens: &'static [&'static str],
    pub prepend_tokens: &'static [&'static str],
    pub append_tokens: &'static [&'static str],
    pub prepend_bos: bool,
    pub append_eos: bool,
    pub use_msa: bool,
}

impl Architecture {
    /// Resolve an architecture from one of its names.
    ///
    /// Any name containing `invariant_gvp` (case-insensitive) selects the
    /// inverse-folding layout.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "ESM-1" | "protein_bert_base" => Ok(Self::Esm1),
            "ESM-1b" | "roberta_large" => Ok(Self::Esm1b),
            "MSA Transformer" | "msa_transformer" => Ok(Self::MsaTransformer),
            n if n.to_lowercase().contains("invariant_gvp") => Ok(Self::InvariantGvp),
            _ => Err(Error::UnknownArchitecture(name.to_string())),
        }
    }

    pub fn config(&self) -> ArchitectureConfig {
        match self {
            Self::Esm1 => ArchitectureConfig {
                standard_tokens: PROTEINSEQ_TOKS,
                prepend_tokens: &["<null_0>", "<pad>", "<eos>", "<unk>"],
                append_tokens: &["<cls>", "<mask>", "<sep>"],
                prepend_bos: true,
                append_eos: false,
                use_msa: false,
            },
            Self::Esm1b => ArchitectureConfig {
                standard_tokens: PROTEINSEQ_TOKS,
                prepend_tokens: &["<cls>", "<pad>", "<eos>", "<unk>"],
                append_tokens: &["<mask>"],
                prepend_bos: true,
                append_eos: true,
                use_msa: false,
            },
            Self::MsaTransformer => ArchitectureConfig {
                standard_tokens: PROTEINSEQ_TOKS,
                prepend_tokens: &["<cls>", "<pad>", "<eos>", "<unk>"],
                append_tokens: &["<mask>"],
                prepend_bos: true,
                append_eos: false,
                use_msa: true,
            },
            Self::InvariantGvp => ArchitectureConfig {
                standard_tokens: PROTEINSEQ_TOKS,
                prepend_tokens: &["<null_0>", "<pad>", "<eos>", "<unk>"],
                append_tokens: &["<mask>", "<cath>", "<af2>"],
                prepend_bos: true,
                append_eos: false,
                use_msa: false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    standard_tokens: Vec<String>,
    prepend_tokens: Vec<String>,
    append_tokens: Vec<String>,
    all_tokens: Vec<String>,
    tok_to_idx: HashMap<String, u32>,
    tokenizer: NoSplitTokenizer,
    pub prepend_bos: bool,
    pub append_eos: bool,
    pub use_msa: bool,
    pub unk_idx: u32,
    pub padding_idx: u32,
    pub cls_idx: u32,
    pub mask_idx: u32,
    pub eos_idx: u32,
}

impl Vocabulary {
    pub fn new<S: AsRef<str>>(
        standard_tokens: &[S],
        prepend_tokens: &[S],
        append_tokens: &[S],
        prepend_bos: bool,
        append_eos: bool,
        use_msa: bool,
    ) -> Result<Self> {
        let to_owned = |toks: &[S]| -> Vec<String> {
            toks.iter().map(|t| t.as_ref().to_string()).collect()
        };
        let standard_tokens = to_owned(standard_tokens);
        let prepend_tokens = to_owned(prepend_tokens);
        let append_tokens = to_owned(append_tokens);

        let mut all_tokens = prepend_tokens.clone();
        all_tokens.extend(standard_tokens.iter().cloned());
        let filler = (VOCAB_ALIGNMENT - all_tokens.len() % VOCAB_ALIGNMENT) % VOCAB_ALIGNMENT;
        all_tokens.extend((1..=filler).map(|i| format!("<null_{i}>")));
        all_tokens.extend(append_tokens.iter().cloned());

        let mut tok_to_idx = HashMap::with_capacity(all_tokens.len());
        for (i, tok) in all_tokens.iter().enumerate() {
            tok_to_idx.entry(tok.clone()).or_insert(i as u32);
        }

        let unk_idx = *tok_to_idx
            .get(UNK_TOKEN)
            .ok_or(Error::MissingUnknownToken)?;
        let lookup = |tok: &str| tok_to_idx.get(tok).copied().unwrap_or(unk_idx);
        let padding_idx = lookup(PAD_TOKEN);
        let cls_idx = lookup(CLS_TOKEN);
        let mask_idx = lookup(MASK_TOKEN);
        let eos_idx = lookup(EOS_TOKEN);

        let tokenizer = NoSplitTokenizer::new(all_tokens.iter().map(String::as_str));

        Ok(Self {
            standard_tokens,
            prepend_tokens,
            append_tokens,
            all_tokens,
            tok_to_idx,
            tokenizer,
            prepend_bos,
            append_eos,
            use_msa,
            unk_idx,
            padding_idx,
            cls_idx,
            mask_idx,
            eos_idx,
        })
    }

    pub fn from_architecture(name: &str) -> Result<Self> {
        Self::try_from(Architecture::from_name(name)?)
    }

    pub fn len(&self) -> usize {
        self.all_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_tokens.is_empty()
    }

    pub fn standard_tokens(&self) -> &[String] {
        &self.standard_tokens
    }

    pub fn prepend_tokens(&self) -> &[String] {
        &self.prepend_tokens
    }

    pub fn append_tokens(&self) -> &[String] {
        &self.append_tokens
    }

    pub fn all_tokens(&self) -> &[String] {
        &self.all_tokens
    }

    pub fn all_special_tokens(&self) -> &'static [&'static str] {
        ALL_SPECIAL_TOKENS
    }

    /// Id of `token`, or the unknown id when absent.
    pub fn get_idx(&self, token: &str) -> u32 {
        self.tok_to_idx.get(token).copied().unwrap_or(self.unk_idx)
    }

    pub fn get_tok(&self, idx: u32) -> Option<&str> {
        self.all_tokens.get(idx as usize).map(String::as_str)
    }

    pub fn to_dict(&self) -> HashMap<String, u32> {
        self.tok_to_idx.clone()
    }

    pub fn tokenize<'a>(&'a self, text: &'a str) -> Vec<&'a str> {
        self.tokenizer.tokenize(text)
    }

    /// Tokenize and map to ids. Never fails: unknown tokens become `unk_idx`.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        self.tokenize(text)
            .into_iter()
            .map(|tok| self.get_idx(tok))
            .collect()
    }

    pub fn batch_converter(&self, truncation_seq_length: Option<usize>) -> DualBatchConverter<'_> {
        DualBatchConverter::new(self, truncation_seq_length)
    }
}

impl TryFrom<Architecture> for Vocabulary {
    type Error = Error;

    fn try_from(arch: Architecture) -> Result<Self> {
        let cfg = arch.config();
        Self::new(
            cfg.standard_tokens,
            cfg.prepend_tokens,
            cfg.append_tokens,
            cfg.prepend_bos,
            cfg.append_eos,
            cfg.use_msa,
        )
    }
}
