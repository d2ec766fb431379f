use proptest::prelude::*;
use provgraph_core::fingerprint;

const MAX_PARTS: usize = 8;

fn parts_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9_:/.-]{0,24}", 1..=MAX_PARTS)
}

proptest! {
    #[test]
    fn deterministic_across_calls(parts in parts_strategy()) {
        prop_assert_eq!(fingerprint(&parts), fingerprint(&parts));
    }

    #[test]
    fn insensitive_to_call_history(a in parts_strategy(), b in parts_strategy()) {
        let first = fingerprint(&a);
        let _ = fingerprint(&b);
        prop_assert_eq!(first, fingerprint(&a));
    }

    #[test]
    fn swapping_distinct_adjacent_parts_changes_the_hash(
        prefix in parts_strategy(),
        a in "[a-z]{1,12}",
        b in "[A-Z]{1,12}",
    ) {
        // a and b draw from disjoint alphabets, so they always differ
        let mut forward = prefix.clone();
        forward.push(a.clone());
        forward.push(b.clone());
        let mut swapped = prefix;
        swapped.push(b);
        swapped.push(a);
        prop_assert_ne!(fingerprint(&forward), fingerprint(&swapped));
    }
}
