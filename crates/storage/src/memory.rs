//! In-memory version store
//!
//! DashMap of per-record version chains, each behind its own mutex.
//!
//! # Design
//!
//! - DashMap: sharded map from record id to chain; lookups only take a shard
//!   read lock long enough to clone the chain's `Arc`
//! - Per-record `Mutex<VersionChain>`: read-latest, merge and append run
//!   under it, so two updates to one record never interleave
//! - `AtomicU64` sequence: store-wide, strictly increasing
//!
//! # Thread Safety
//!
//! - create(): atomic via the DashMap entry API (check-then-insert under the
//!   shard lock)
//! - append_update(): locks only the target record's chain
//! - Different records never contend beyond a brief shard lookup

use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHasher;
use tracing::debug;

use timetravel_core::{
    date, merge, Error, Record, RecordData, RecordHistory, RecordId, Result, Sequence, UpdateMap,
    VersionStore,
};

use crate::chain::VersionChain;

type FxBuild = BuildHasherDefault<FxHasher>;
type SharedChain = Arc<Mutex<VersionChain>>;

/// Version store held entirely in process memory
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use timetravel_storage::MemoryStore;
///
/// let store = Arc::new(MemoryStore::new());
/// store.create(id, data)?;
/// ```
pub struct MemoryStore {
    chains: DashMap<RecordId, SharedChain, FxBuild>,
    sequence: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            chains: DashMap::default(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Create with an expected number of records
    pub fn with_capacity(records: usize) -> Self {
        Self {
            chains: DashMap::with_capacity_and_hasher(records, FxBuild::default()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Highest sequence assigned so far
    #[inline]
    pub fn current_sequence(&self) -> Sequence {
        Sequence::new(self.sequence.load(Ordering::Acquire))
    }

    #[inline]
    fn next_sequence(&self) -> Sequence {
        Sequence::new(self.sequence.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Number of records (not versions)
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Check if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Total number of versions across all records
    pub fn total_versions(&self) -> usize {
        self.chains
            .iter()
            .map(|entry| entry.value().lock().version_count())
            .sum()
    }

    fn chain(&self, id: RecordId) -> Result<SharedChain> {
        self.chains
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::NotFound { id: id.get() })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &self.len())
            .field("sequence", &self.current_sequence())
            .finish()
    }
}

impl VersionStore for MemoryStore {
    fn create(&self, id: RecordId, data: RecordData) -> Result<Record> {
        match self.chains.entry(id) {
            Entry::Occupied(_) => Err(Error::AlreadyExists { id: id.get() }),
            Entry::Vacant(slot) => {
                let record = Record::genesis(id, data, self.next_sequence(), date::now());
                slot.insert(Arc::new(Mutex::new(VersionChain::new(record.clone()))));
                debug!(target: "timetravel::store", %id, seq = %record.sequence, "created record");
                Ok(record)
            }
        }
    }

    fn get_latest(&self, id: RecordId) -> Result<Record> {
        let chain = self.chain(id)?;
        let guard = chain.lock();
        guard
            .latest()
            .cloned()
            .ok_or(Error::NotFound { id: id.get() })
    }

    fn get_at_effective_date(&self, id: RecordId, date: Option<NaiveDate>) -> Result<Record> {
        let Some(date) = date else {
            return self.get_latest(id);
        };
        let date = date::check_range(date)?;
        let chain = self.chain(id)?;
        let guard = chain.lock();
        guard
            .at_effective_date(date)
            .cloned()
            .ok_or(Error::NotFound { id: id.get() })
    }

    fn get_all_versions(&self, id: RecordId) -> Result<RecordHistory> {
        let chain = self.chain(id)?;
        let guard = chain.lock();
        guard.history().ok_or(Error::NotFound { id: id.get() })
    }

    fn append_update(
        &self,
        id: RecordId,
        updates: UpdateMap,
        effective_date: Option<NaiveDate>,
    ) -> Result<Record> {
        let effective_date = effective_date.map(date::check_range).transpose()?;
        let chain = self.chain(id)?;
        let mut guard = chain.lock();

        let latest = guard.latest().ok_or(Error::NotFound { id: id.get() })?;
        let data = merge(&latest.data, &updates);

        let now = date::now();
        let effective = effective_date.map(date::start_of_day).unwrap_or(now);
        let record = Record::revision(id, data, updates, self.next_sequence(), effective, now);
        guard.push(record.clone());

        debug!(
            target: "timetravel::store",
            %id,
            seq = %record.sequence,
            versions = guard.version_count(),
            "appended version"
        );
        Ok(record)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
