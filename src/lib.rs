//! timetravel - a record store that keeps every version of every record
//!
//! Records are flat string maps addressed by a positive integer id. Writes
//! never overwrite: each update appends a new version, and any past version
//! can be read back by effective date.
//!
//! # Quick Start
//!
//! ```ignore
//! use timetravel::{open_store, RecordService, StorageKind};
//!
//! let store = open_store(StorageKind::Memory, "./data/data.db")?;
//! let service = RecordService::new(store);
//!
//! service.upsert(1, [("name".into(), Some("Alice".into()))].into(), None)?;
//! service.upsert(1, [("name".into(), None)].into(), None)?;
//! assert_eq!(service.history(1)?.len(), 2);
//! ```
//!
//! # Architecture
//!
//! - `timetravel-core`: record types, the update merger, `VersionStore`
//! - `timetravel-storage`: memory and SQLite backends
//! - `timetravel-service`: id validation and the upsert policy
//! - `timetravel-server`: the HTTP API (binary `timetravel`)

pub use timetravel_core::{
    date, genesis_data, merge, Error, Record, RecordData, RecordHistory, RecordId, Result,
    Sequence, UpdateMap, VersionStore,
};
pub use timetravel_service::{open_store, RecordService, StorageKind};
pub use timetravel_storage::{MemoryStore, SqliteStore};
