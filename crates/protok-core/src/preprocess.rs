//! Residue-level preprocessing: masking for perturbed inputs and the
//! normalization used before residue-budget streaming.
use crate::constants::{AA2FOLD_PREFIX, MASK_TOKEN, STANDARD_AA, UNKNOWN_RESIDUE};
use itertools::Itertools;
use rand::Rng;

/// Replace each residue with `<mask>` independently with probability `fraction`.
///
/// `fraction` is clamped to `[0, 1]`; `NaN` masks nothing.
pub fn mask_sequence<R: Rng + ?Sized>(sequence: &str, fraction: f64, rng: &mut R) -> String {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let mut out = String::with_capacity(sequence.len());
    for residue in sequence.chars() {
        if rng.gen_bool(fraction) {
            out.push_str(MASK_TOKEN);
        } else {
            out.push(residue);
        }
    }
    out
}

/// Fold everything outside the 20 canonical amino acids into `X`.
pub fn normalize_residues(sequence: &str) -> String {
    sequence
        .chars()
        .map(|c| if STANDARD_AA.contains(c) { c } else { UNKNOWN_RESIDUE })
        .collect()
}

/// `<AA2fold>` followed by the residues separated by single spaces.
pub fn prostt5_input(sequence: &str) -> String {
    format!("{} {}", AA2FOLD_PREFIX, sequence.chars().join(" "))
}
