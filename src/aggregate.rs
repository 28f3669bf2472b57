//! Aggregate module: merges many upstream outputs into one signal set.

#![forbid(unsafe_code)]

use crate::invariant_ppt::{assert_invariant, AGGREGATE_NO_ZERO, AGGREGATE_UNIQUE_NAMES};
use crate::signal::{Signal, SignalSet};
use crate::source::Source;

/// Merge signal slices in order.
///
/// Entries are keyed by name; the first occurrence of a name decides the identity
/// (and so the category) of the merged entry. Values per name are summed with
/// wrapping arithmetic, zero sums are dropped, and the result keeps order of first
/// appearance.
pub fn aggregate<'a, I>(inputs: I) -> SignalSet
where
    I: IntoIterator<Item = &'a [Signal]>,
{
    let mut merged: SignalSet = Vec::new();
    for signal in inputs.into_iter().flatten() {
        match merged.iter_mut().find(|m| m.id.same_channel(&signal.id)) {
            Some(entry) => entry.value = entry.value.wrapping_add(signal.value),
            None => merged.push(signal.clone()),
        }
    }
    merged.retain(|s| s.value != 0);

    assert_invariant(
        AGGREGATE_UNIQUE_NAMES,
        merged
            .iter()
            .enumerate()
            .all(|(i, s)| merged[..i].iter().all(|p| !p.id.same_channel(&s.id))),
        "Aggregated set holds a duplicate name",
        Some("aggregate"),
    );
    assert_invariant(
        AGGREGATE_NO_ZERO,
        merged.iter().all(|s| s.value != 0),
        "Aggregated set holds a zero value",
        Some("aggregate"),
    );
    merged
}

/// Merge the committed output of every source.
pub fn aggregate_sources(sources: &[&dyn Source]) -> SignalSet {
    aggregate(sources.iter().map(|s| s.signals()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{SignalId, SignalType};
    use proptest::prelude::*;

    fn sig(name: &str, value: i32) -> Signal {
        Signal::new(SignalId::virtual_signal(name), value)
    }

    #[test]
    fn aggregate_sums_and_drops_zero() {
        let a = vec![
            sig("a", -1),
            sig("b", 1),
            sig("c", 2),
            sig("d", 3),
            sig("e", 4),
            sig("f", 2),
        ];
        let b = vec![sig("b", -1), sig("f", 2)];
        let merged = aggregate_sources(&[&a, &b]);
        assert_eq!(
            merged,
            vec![sig("a", -1), sig("c", 2), sig("d", 3), sig("e", 4), sig("f", 4)]
        );
    }

    #[test]
    fn aggregate_first_category_wins() {
        let a = vec![Signal::new(SignalId::item("x"), 2)];
        let b = vec![Signal::new(SignalId::fluid("x"), 3)];
        let merged = aggregate_sources(&[&a, &b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id.signal_type, SignalType::Item);
        assert_eq!(merged[0].value, 5);

        let merged = aggregate_sources(&[&b, &a]);
        assert_eq!(merged[0].id.signal_type, SignalType::Fluid);
    }

    #[test]
    fn aggregate_of_nothing_is_empty() {
        assert!(aggregate_sources(&[]).is_empty());
        let empty: Vec<Signal> = Vec::new();
        assert!(aggregate_sources(&[&empty, &empty]).is_empty());
    }

    #[test]
    fn aggregate_wraps_on_overflow() {
        let a = vec![sig("a", i32::MAX)];
        let b = vec![sig("a", 1)];
        assert_eq!(aggregate_sources(&[&a, &b]), vec![sig("a", i32::MIN)]);
    }

    fn arb_set() -> impl Strategy<Value = Vec<Signal>> {
        prop::collection::vec(("[a-e]", -5i32..5), 0..12).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(name, value)| sig(&name, value))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn aggregate_unique_nonzero_and_summed(a in arb_set(), b in arb_set(), c in arb_set()) {
            let merged = aggregate_sources(&[&a, &b, &c]);
            for (i, s) in merged.iter().enumerate() {
                prop_assert!(s.value != 0);
                prop_assert!(merged[..i].iter().all(|p| p.id.name != s.id.name));
            }
            for name in ["a", "b", "c", "d", "e"] {
                let total: i32 = a.iter().chain(&b).chain(&c)
                    .filter(|s| s.id.name == name)
                    .map(|s| s.value)
                    .sum();
                let got = merged.iter().find(|s| s.id.name == name).map(|s| s.value).unwrap_or(0);
                prop_assert_eq!(got, total);
            }
        }
    }
}
