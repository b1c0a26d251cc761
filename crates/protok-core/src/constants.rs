// Protein alphabet shared by every sequence architecture.
pub const PROTEINSEQ_TOKS: &[&str] = &[
    "L", "A", "G", "V", "S", "E", "R", "T", "I", "D", "P", "K", "Q", "N", "F", "Y", "M", "H", "W",
    "C", "X", "B", "U", "Z", "O", ".", "-",
];

pub const UNK_TOKEN: &str = "<unk>";
pub const PAD_TOKEN: &str = "<pad>";
pub const CLS_TOKEN: &str = "<cls>";
pub const MASK_TOKEN: &str = "<mask>";
pub const EOS_TOKEN: &str = "<eos>";

pub const ALL_SPECIAL_TOKENS: &[&str] = &[EOS_TOKEN, UNK_TOKEN, PAD_TOKEN, CLS_TOKEN, MASK_TOKEN];

/// Filler tokens pad `all_tokens` up to a multiple of this width.
pub const VOCAB_ALIGNMENT: usize = 8;

// The 20 canonical amino acids. Anything else is folded into `X` on the residue path.
pub const STANDARD_AA: &str = "ACDEFGHIKLMNPQRSTVWY";
pub const UNKNOWN_RESIDUE: char = 'X';

/// Task prefix expected by ProstT5-style encoders for amino-acid input.
pub const AA2FOLD_PREFIX: &str = "<AA2fold>";
