//! Version chain of a single record
//!
//! Versions are stored in descending order (newest first). Reads almost
//! always want the latest version, which sits at the front.
//!
//! # Performance
//!
//! Uses VecDeque for O(1) push_front. Records that are updated many times
//! never pay for shifting older versions.

use std::collections::VecDeque;

use chrono::NaiveDate;
use timetravel_core::{Record, RecordHistory};

/// Append-only list of versions, newest first
#[derive(Debug, Clone)]
pub struct VersionChain {
    versions: VecDeque<Record>,
}

impl VersionChain {
    /// Create a chain holding the genesis version
    pub fn new(genesis: Record) -> Self {
        let mut versions = VecDeque::with_capacity(4);
        versions.push_front(genesis);
        Self { versions }
    }

    /// Add a new version (must be newer than every existing version)
    #[inline]
    pub fn push(&mut self, record: Record) {
        debug_assert!(
            self.versions
                .front()
                .map_or(true, |latest| latest.sequence < record.sequence),
            "sequence must increase along the chain"
        );
        self.versions.push_front(record);
    }

    /// Get the latest version
    #[inline]
    pub fn latest(&self) -> Option<&Record> {
        self.versions.front()
    }

    /// Get the genesis version
    #[inline]
    pub fn earliest(&self) -> Option<&Record> {
        self.versions.back()
    }

    /// Get the version in effect on `date`
    ///
    /// The newest version whose effective date is on or before `date`;
    /// the earliest version if none qualifies.
    pub fn at_effective_date(&self, date: NaiveDate) -> Option<&Record> {
        self.versions
            .iter()
            .find(|r| r.is_effective_by(date))
            .or_else(|| self.earliest())
    }

    /// Number of versions stored
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Owned copy of every version, newest first
    pub fn history(&self) -> Option<RecordHistory> {
        RecordHistory::new(self.versions.iter().cloned().collect())
    }
}
