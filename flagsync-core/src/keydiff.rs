//! Key-set partition between two string-keyed maps.
//!
//! Used identically at the environment level and at the flag level by the
//! reconciler: every key from either map lands in exactly one of the three
//! output sets.

use std::collections::{BTreeMap, BTreeSet};

/// Partition of the union of two key sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyDiff {
    /// Present in the new map only.
    pub added: BTreeSet<String>,
    /// Present in both maps.
    pub existing: BTreeSet<String>,
    /// Present in the old map only.
    pub removed: BTreeSet<String>,
}

/// Classify the keys of `old` and `new`. Pure; empty maps are fine.
pub fn diff_keys<A, B>(old: &BTreeMap<String, A>, new: &BTreeMap<String, B>) -> KeyDiff {
    let mut diff = KeyDiff::default();
    for key in old.keys() {
        if new.contains_key(key) {
            diff.existing.insert(key.clone());
        } else {
            diff.removed.insert(key.clone());
        }
    }
    for key in new.keys() {
        if !old.contains_key(key) {
            diff.added.insert(key.clone());
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(keys: &[&str]) -> BTreeMap<String, u32> {
        keys.iter().map(|k| (k.to_string(), 0)).collect()
    }

    #[test]
    fn partitions_overlapping_maps() {
        let old = map_of(&["a", "b"]);
        let new = map_of(&["b", "c"]);
        let diff = diff_keys(&old, &new);
        assert_eq!(diff.added, BTreeSet::from(["c".to_string()]));
        assert_eq!(diff.existing, BTreeSet::from(["b".to_string()]));
        assert_eq!(diff.removed, BTreeSet::from(["a".to_string()]));
    }

    #[test]
    fn empty_maps_produce_empty_sets() {
        let empty: BTreeMap<String, u32> = BTreeMap::new();
        let diff = diff_keys(&empty, &empty);
        assert!(diff.added.is_empty());
        assert!(diff.existing.is_empty());
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn every_key_lands_in_exactly_one_set() {
        let old = map_of(&["a", "b", "c", "d"]);
        let new = map_of(&["c", "d", "e"]);
        let diff = diff_keys(&old, &new);

        let mut union: BTreeSet<String> = old.keys().cloned().collect();
        union.extend(new.keys().cloned());

        let mut seen = BTreeSet::new();
        for set in [&diff.added, &diff.existing, &diff.removed] {
            for key in set {
                assert!(seen.insert(key.clone()), "key {key} appeared twice");
            }
        }
        assert_eq!(seen, union);
    }

    #[test]
    fn value_types_may_differ() {
        let old: BTreeMap<String, u32> = map_of(&["a"]);
        let new: BTreeMap<String, &str> = [("a".to_string(), "x")].into();
        let diff = diff_keys(&old, &new);
        assert_eq!(diff.existing.len(), 1);
    }
}
