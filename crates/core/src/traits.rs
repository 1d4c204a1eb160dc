//! Version store abstraction
//!
//! This module defines the `VersionStore` trait. The in-memory and SQLite
//! backends both implement it, so the service facade and the HTTP layer
//! never know which medium holds the history.

use chrono::NaiveDate;

use crate::error::Result;
use crate::history::RecordHistory;
use crate::record::{Record, RecordData, UpdateMap};
use crate::types::RecordId;

/// Append-only history of record versions
///
/// Thread safety: every method may be called concurrently from many
/// threads (requires Send + Sync). Implementations serialize
/// `create` and `append_update` per record id; operations on different ids
/// do not wait on each other.
///
/// Every returned `Record` is an owned copy. Mutating it never changes
/// stored state.
pub trait VersionStore: Send + Sync {
    /// Write the genesis version of a record
    ///
    /// The existence check and the insert form one critical section.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if any version exists for `id`
    /// - `Serialization` / `StorageUnavailable` on persistence failure
    fn create(&self, id: RecordId, data: RecordData) -> Result<Record>;

    /// Get the version with the highest sequence
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no version exists for `id`.
    fn get_latest(&self, id: RecordId) -> Result<Record>;

    /// Get the version in effect on a given day
    ///
    /// With `None` this is `get_latest`. With a date, returns the latest
    /// version (by sequence) whose effective date is on or before that day,
    /// or the earliest version if none qualifies.
    ///
    /// # Errors
    ///
    /// - `InvalidDate` if `date` lies outside years 0001..=9999
    /// - `NotFound` if no version exists for `id`
    fn get_at_effective_date(&self, id: RecordId, date: Option<NaiveDate>) -> Result<Record>;

    /// Get every version, newest first
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no version exists for `id`.
    fn get_all_versions(&self, id: RecordId) -> Result<RecordHistory>;

    /// Merge `updates` into the latest version and append the result
    ///
    /// Read-latest, merge and append happen under the record's lock, so
    /// concurrent updates to the same id never lose each other's keys.
    /// The stored version keeps `updates` exactly as given.
    ///
    /// # Errors
    ///
    /// - `InvalidDate` if `effective_date` lies outside years 0001..=9999
    /// - `NotFound` if no version exists for `id`
    /// - `Serialization` / `StorageUnavailable` on persistence failure
    fn append_update(
        &self,
        id: RecordId,
        updates: UpdateMap,
        effective_date: Option<NaiveDate>,
    ) -> Result<Record>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
