//! Per-record lock table
//!
//! Serializes read-merge-append and check-then-insert sequences for one
//! record id while leaving other ids free to proceed.
//!
//! The table holds one small mutex per id ever written. Entries are never
//! removed; the history itself is never removed either, so the table grows
//! no faster than the data.

use std::hash::BuildHasherDefault;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHasher;
use timetravel_core::RecordId;

type FxBuild = BuildHasherDefault<FxHasher>;

/// Lock table keyed by record id
#[derive(Debug, Default)]
pub struct RecordLocks {
    locks: DashMap<RecordId, Arc<Mutex<()>>, FxBuild>,
}

impl RecordLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `id`
    ///
    /// The DashMap shard guard is released before `f` runs; only the
    /// record's own mutex is held for the duration of the call.
    pub fn with_lock<T>(&self, id: RecordId, f: impl FnOnce() -> T) -> T {
        let lock = Arc::clone(self.locks.entry(id).or_default().value());
        let _guard = lock.lock();
        f()
    }

    /// Number of ids that have ever been locked
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Check if no id has been locked yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
