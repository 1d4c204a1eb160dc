//! Version history of a single record
//!
//! `RecordHistory` wraps a non-empty `Vec<Record>` ordered newest-first.
//! Index into it: `h[0]` = latest, `h[1]` = previous, `h.len()` = total
//! versions. It is an owned snapshot taken at call time; later writes to
//! the store do not show up in it.

use std::ops::Index;

use crate::record::Record;
use crate::types::RecordId;

/// A non-empty sequence of record versions, ordered newest-first.
///
/// # Example
///
/// ```ignore
/// let history = store.get_all_versions(id)?;
/// let latest = &history[0];
/// println!("total versions: {}", history.len());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHistory {
    /// Versions ordered newest-first. Always non-empty.
    versions: Vec<Record>,
}

impl RecordHistory {
    /// Create a history from versions ordered newest-first.
    ///
    /// Returns `None` if the input is empty (record does not exist).
    pub fn new(versions: Vec<Record>) -> Option<Self> {
        if versions.is_empty() {
            None
        } else {
            debug_assert!(
                versions.windows(2).all(|w| w[0].sequence > w[1].sequence),
                "history must be ordered newest-first"
            );
            Some(Self { versions })
        }
    }

    /// Id shared by every version
    pub fn id(&self) -> RecordId {
        self.versions[0].id
    }

    /// The latest version
    pub fn latest(&self) -> &Record {
        &self.versions[0]
    }

    /// The genesis version
    pub fn earliest(&self) -> &Record {
        &self.versions[self.versions.len() - 1]
    }

    /// Number of versions
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate newest-first
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.versions.iter()
    }

    /// All versions (newest-first)
    pub fn versions(&self) -> &[Record] {
        &self.versions
    }

    /// Consume and return the inner vector (newest-first)
    pub fn into_versions(self) -> Vec<Record> {
        self.versions
    }
}

impl Index<usize> for RecordHistory {
    type Output = Record;

    fn index(&self, index: usize) -> &Self::Output {
        &self.versions[index]
    }
}

impl IntoIterator for RecordHistory {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordHistory {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.iter()
    }
}
