//! Update merging
//!
//! Computes the data of the next version from the data of the latest
//! version and a sparse update map. Both functions are pure: the input
//! data is never modified and a fresh map is returned.

use crate::record::{RecordData, UpdateMap};

/// Apply a sparse update to `current`
///
/// - `Some(value)` sets or overwrites the key
/// - `None` removes the key; removing an absent key is a no-op
/// - keys not mentioned in `update` are carried over unchanged
pub fn merge(current: &RecordData, update: &UpdateMap) -> RecordData {
    let mut next = current.clone();
    for (key, value) in update {
        match value {
            Some(v) => {
                next.insert(key.clone(), v.clone());
            }
            None => {
                next.remove(key);
            }
        }
    }
    next
}

/// Initial data for a record created from an update map
///
/// Deletion markers have nothing to delete on the first write and are
/// dropped.
pub fn genesis_data(update: &UpdateMap) -> RecordData {
    update
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> RecordData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn update(pairs: &[(&str, Option<&str>)]) -> UpdateMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_merge_sets_and_overwrites() {
        let current = data(&[("name", "Alice")]);
        let next = merge(&current, &update(&[("name", Some("Bob")), ("age", Some("30"))]));
        assert_eq!(next, data(&[("name", "Bob"), ("age", "30")]));
    }

    #[test]
    fn test_merge_deletes_on_null() {
        let current = data(&[("name", "Bob"), ("age", "30")]);
        let next = merge(&current, &update(&[("age", None)]));
        assert_eq!(next, data(&[("name", "Bob")]));
    }

    #[test]
    fn test_merge_delete_missing_key_is_noop() {
        let current = data(&[("name", "Bob")]);
        let next = merge(&current, &update(&[("missing", None)]));
        assert_eq!(next, current);
    }

    #[test]
    fn test_merge_does_not_touch_input() {
        let current = data(&[("a", "1"), ("b", "2")]);
        let snapshot = current.clone();
        let _ = merge(&current, &update(&[("a", None), ("b", Some("3"))]));
        assert_eq!(current, snapshot);
    }

    #[test]
    fn test_merge_empty_update_is_identity() {
        let current = data(&[("a", "1")]);
        assert_eq!(merge(&current, &UpdateMap::new()), current);
    }

    #[test]
    fn test_genesis_drops_deletions() {
        let u = update(&[("name", Some("Alice")), ("ghost", None)]);
        assert_eq!(genesis_data(&u), data(&[("name", "Alice")]));
    }

    #[test]
    fn test_genesis_of_only_deletions_is_empty() {
        let u = update(&[("a", None), ("b", None)]);
        assert!(genesis_data(&u).is_empty());
    }
}
