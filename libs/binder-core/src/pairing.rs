//! Pair keys: faces that must stay side by side regardless of their names.

use crate::types::{CardEntry, VariantPairHint};
use std::collections::HashMap;

/// Pairing keys by position in the entry sequence.
///
/// Keys attach to slots, not values: two identical entries in different
/// slots are tracked independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairKeyMap {
    keys: HashMap<usize, String>,
}

impl PairKeyMap {
    /// Resolve hints against `entries`. A hint applies only when both its
    /// base and variant match exactly one front-facing entry each.
    pub fn build(entries: &[CardEntry], hints: &[VariantPairHint]) -> Self {
        let mut map = Self::default();

        for hint in hints {
            let base = unique_match(entries, &hint.set_code, &hint.base_number);
            let variant = unique_match(entries, &hint.set_code, &hint.variant_number);
            let (Some(base), Some(variant)) = (base, variant) else {
                tracing::debug!(?hint, "pair hint has no unique match");
                continue;
            };
            if base == variant || map.keys.contains_key(&base) || map.keys.contains_key(&variant) {
                tracing::debug!(?hint, "pair hint overlaps an existing pair");
                continue;
            }

            let key = format!(
                "{}|{}|{}",
                hint.set_code.to_ascii_lowercase(),
                hint.base_number,
                hint.variant_number
            );
            map.keys.insert(base, key.clone());
            map.keys.insert(variant, key);
        }

        map
    }

    /// Rebuild from keys previously written by [`PairKeyMap::stamp`].
    pub fn from_stamped(entries: &[CardEntry]) -> Self {
        let keys = entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| entry.pair_key.clone().map(|key| (idx, key)))
            .collect();
        Self { keys }
    }

    /// Write each key into its entry so it survives a trip through the cache.
    pub fn stamp(&self, entries: &mut [CardEntry]) {
        for (idx, entry) in entries.iter_mut().enumerate() {
            entry.pair_key = self.keys.get(&idx).cloned();
        }
    }

    pub fn key(&self, idx: usize) -> Option<&str> {
        self.keys.get(&idx).map(String::as_str)
    }

    pub fn shares_key(&self, a: usize, b: usize) -> bool {
        match (self.key(a), self.key(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn unique_match(entries: &[CardEntry], set_code: &str, number: &str) -> Option<usize> {
    let mut found = entries.iter().enumerate().filter(|(_, entry)| {
        !entry.is_back_face
            && entry.number == number
            && entry
                .set
                .as_deref()
                .is_some_and(|set| set.eq_ignore_ascii_case(set_code))
    });
    let (idx, _) = found.next()?;
    found.next().is_none().then_some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, number: &str) -> CardEntry {
        CardEntry::new(name, number, Some("NEO"))
    }

    #[test]
    fn builds_key_for_unique_matches() {
        let entries = vec![entry("A", "12"), entry("B", "12/jp"), entry("C", "13")];
        let map = PairKeyMap::build(&entries, &[VariantPairHint::new("neo", "12", "12/jp")]);
        assert_eq!(map.len(), 2);
        assert!(map.shares_key(0, 1));
        assert!(!map.shares_key(1, 2));
        assert_eq!(map.key(2), None);
    }

    #[test]
    fn ambiguous_matches_are_skipped() {
        let entries = vec![entry("A", "12"), entry("A", "12"), entry("B", "12/jp")];
        let map = PairKeyMap::build(&entries, &[VariantPairHint::new("NEO", "12", "12/jp")]);
        assert!(map.is_empty());
    }

    #[test]
    fn missing_variant_is_skipped() {
        let entries = vec![entry("A", "296")];
        let map = PairKeyMap::build(&entries, &[VariantPairHint::new("NEO", "296", "361")]);
        assert!(map.is_empty());
    }

    #[test]
    fn back_faces_never_match() {
        let front = CardEntry::two_sided("F", "B", "5", Some("NEO"));
        let back = CardEntry::back_of(&front);
        let entries = vec![front, back, entry("V", "5/jp")];
        let map = PairKeyMap::build(&entries, &[VariantPairHint::new("NEO", "5", "5/jp")]);
        assert!(map.shares_key(0, 2));
        assert_eq!(map.key(1), None);
    }

    #[test]
    fn overlapping_hints_keep_the_first() {
        let entries = vec![entry("A", "1"), entry("B", "2"), entry("C", "3")];
        let hints = [
            VariantPairHint::new("NEO", "1", "2"),
            VariantPairHint::new("NEO", "2", "3"),
        ];
        let map = PairKeyMap::build(&entries, &hints);
        assert!(map.shares_key(0, 1));
        assert_eq!(map.key(2), None);
    }

    #[test]
    fn stamp_round_trips() {
        let mut entries = vec![entry("A", "12"), entry("B", "12/jp"), entry("C", "13")];
        let map = PairKeyMap::build(&entries, &[VariantPairHint::new("NEO", "12", "12/jp")]);
        map.stamp(&mut entries);
        assert_eq!(PairKeyMap::from_stamped(&entries), map);
    }
}
