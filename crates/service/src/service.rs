//! Record service facade
//!
//! Thin layer over a shared `VersionStore`. Validates raw ids and turns a
//! sparse update map into either a create or a merge.
//!
//! # Upsert
//!
//! ```text
//! get_latest(id)
//!   NotFound -> create(id, genesis_data(updates))
//!                 AlreadyExists -> append_update(id, updates)   (lost the race)
//!   Ok       -> append_update(id, updates)
//! ```
//!
//! `NotFound` never escapes an upsert.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use timetravel_core::{
    genesis_data, Error, Record, RecordData, RecordHistory, RecordId, Result, UpdateMap,
    VersionStore,
};

/// Service facade over a version store
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn VersionStore>,
}

impl RecordService {
    /// Wrap a shared store
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn VersionStore> {
        &self.store
    }

    /// Latest version of a record
    pub fn get(&self, id: i64) -> Result<Record> {
        self.store.get_latest(RecordId::new(id)?)
    }

    /// Version in effect on `date` (latest when `None`)
    pub fn get_as_of(&self, id: i64, date: Option<NaiveDate>) -> Result<Record> {
        self.store.get_at_effective_date(RecordId::new(id)?, date)
    }

    /// Every version of a record, newest first
    pub fn history(&self, id: i64) -> Result<RecordHistory> {
        self.store.get_all_versions(RecordId::new(id)?)
    }

    /// Create a record from full initial data
    pub fn create(&self, id: i64, data: RecordData) -> Result<Record> {
        let record = self.store.create(RecordId::new(id)?, data)?;
        debug!(target: "timetravel::service", id, "record created");
        Ok(record)
    }

    /// Merge an update into an existing record
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record was never created.
    pub fn update(
        &self,
        id: i64,
        updates: UpdateMap,
        effective_date: Option<NaiveDate>,
    ) -> Result<Record> {
        let record = self
            .store
            .append_update(RecordId::new(id)?, updates, effective_date)?;
        debug!(
            target: "timetravel::service",
            id,
            seq = %record.sequence,
            "record updated"
        );
        Ok(record)
    }

    /// Create the record on first write, merge into it afterwards
    ///
    /// On create, null values in `updates` are dropped and `effective_date`
    /// is ignored (the first version takes effect when written).
    pub fn upsert(
        &self,
        id: i64,
        updates: UpdateMap,
        effective_date: Option<NaiveDate>,
    ) -> Result<Record> {
        let record_id = RecordId::new(id)?;
        match self.store.get_latest(record_id) {
            Ok(_) => self.update(id, updates, effective_date),
            Err(Error::NotFound { .. }) => {
                match self.store.create(record_id, genesis_data(&updates)) {
                    Ok(record) => {
                        debug!(target: "timetravel::service", id, "record created by upsert");
                        Ok(record)
                    }
                    Err(Error::AlreadyExists { .. }) => {
                        warn!(
                            target: "timetravel::service",
                            id,
                            "record created concurrently, retrying as update"
                        );
                        self.update(id, updates, effective_date)
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for RecordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordService")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}
