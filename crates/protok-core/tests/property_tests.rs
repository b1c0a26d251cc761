//! Property-based tests for partitioning, tokenization and vocabulary lookups.

use proptest::prelude::*;
use protok_core::{
    partition_by_token_budget, ResidueBudget, ResidueBudgetStreamer, SequenceRecord, Vocabulary,
};

// ── Strategies ──────────────────────────────────────────────────────────────

fn arb_lengths() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..600, 0..80)
}

fn arb_protein() -> impl Strategy<Value = String> {
    "[ACDEFGHIKLMNPQRSTVWYXBUZO]{1,60}"
}

fn arb_budget() -> impl Strategy<Value = ResidueBudget> {
    (1usize..2_000, 1usize..800, 1usize..20).prop_map(|(max_residues, max_seq_len, max_batch)| {
        ResidueBudget {
            max_residues,
            max_seq_len,
            max_batch,
        }
    })
}

// ── Token-budget partitioner ────────────────────────────────────────────────

proptest! {
    /// Every index shows up in exactly one group.
    #[test]
    fn partition_covers_every_index_once(
        lengths in arb_lengths(),
        toks_per_batch in 1usize..4096,
        extra in 0usize..3,
    ) {
        let groups = partition_by_token_budget(&lengths, toks_per_batch, extra);
        let mut seen: Vec<usize> = groups.iter().flatten().copied().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..lengths.len()).collect::<Vec<_>>());
        prop_assert!(groups.iter().all(|g| !g.is_empty()));
    }

    /// Groups over budget are always singletons.
    #[test]
    fn partition_respects_budget(
        lengths in arb_lengths(),
        toks_per_batch in 1usize..4096,
        extra in 0usize..3,
    ) {
        for group in partition_by_token_budget(&lengths, toks_per_batch, extra) {
            let longest = group.iter().map(|&i| lengths[i] + extra).max().unwrap_or(0);
            if group.len() > 1 {
                prop_assert!(longest * group.len() <= toks_per_batch);
            }
        }
    }

    /// Within a group, lengths never decrease.
    #[test]
    fn partition_groups_are_length_sorted(lengths in arb_lengths(), toks_per_batch in 1usize..4096) {
        for group in partition_by_token_budget(&lengths, toks_per_batch, 0) {
            prop_assert!(group.windows(2).all(|w| lengths[w[0]] <= lengths[w[1]]));
        }
    }

    #[test]
    fn partition_is_idempotent(lengths in arb_lengths(), toks_per_batch in 1usize..4096) {
        prop_assert_eq!(
            partition_by_token_budget(&lengths, toks_per_batch, 1),
            partition_by_token_budget(&lengths, toks_per_batch, 1)
        );
    }
}

// ── Residue-budget streamer ─────────────────────────────────────────────────

proptest! {
    /// Each sequence is planned exactly once and batches stay within `max_batch`.
    #[test]
    fn streamer_plans_every_sequence_once(lengths in arb_lengths(), budget in arb_budget()) {
        let records: Vec<(String, String)> = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| (format!("s{i}"), "M".repeat(len)))
            .collect();
        let plan = ResidueBudgetStreamer::new(budget).plan(records);

        let mut ids: Vec<String> = plan.iter().flat_map(|b| b.ids.clone()).collect();
        ids.sort();
        let mut expected: Vec<String> = (0..lengths.len()).map(|i| format!("s{i}")).collect();
        expected.sort();
        prop_assert_eq!(ids, expected);

        prop_assert!(plan.iter().all(|b| !b.is_empty() && b.len() <= budget.max_batch));
        let order: Vec<usize> = plan.iter().flat_map(|b| b.lengths.clone()).collect();
        prop_assert!(order.windows(2).all(|w| w[0] >= w[1]));
    }
}

// ── Vocabulary and converter ────────────────────────────────────────────────

proptest! {
    #[test]
    fn encoded_residues_are_one_token_each(seq in arb_protein()) {
        let vocab = Vocabulary::from_architecture("ESM-1b").unwrap();
        let ids = vocab.encode(&seq);
        prop_assert_eq!(ids.len(), seq.chars().count());
        prop_assert!(ids.iter().all(|&id| id != vocab.unk_idx));
    }

    #[test]
    fn converter_shape_follows_longest_perturbed(seqs in prop::collection::vec(arb_protein(), 1..8)) {
        let vocab = Vocabulary::from_architecture("ESM-1b").unwrap();
        let batch: Vec<SequenceRecord> = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| SequenceRecord::unperturbed(format!("p{i}"), s.as_str()))
            .collect();
        let out = vocab.batch_converter(None).convert(&batch).unwrap();
        let longest = seqs.iter().map(|s| s.chars().count()).max().unwrap();
        prop_assert_eq!(out.clean.dims2().unwrap(), (seqs.len(), longest + 2));
        prop_assert_eq!(out.clean.to_vec2::<i64>().unwrap(), out.perturbed.to_vec2::<i64>().unwrap());
    }
}

#[test]
fn vocabulary_round_trips_every_token() {
    for name in ["ESM-1", "ESM-1b", "MSA Transformer", "invariant_gvp"] {
        let vocab = Vocabulary::from_architecture(name).unwrap();
        for tok in vocab.all_tokens() {
            assert_eq!(vocab.get_tok(vocab.get_idx(tok)), Some(tok.as_str()));
        }
        assert_eq!(vocab.len() % 8, vocab.append_tokens().len() % 8);
    }
}

#[test]
fn special_token_alone_is_one_token() {
    let vocab = Vocabulary::from_architecture("ESM-1b").unwrap();
    for special in vocab.all_special_tokens() {
        assert_eq!(vocab.tokenize(special), vec![*special]);
    }
}
