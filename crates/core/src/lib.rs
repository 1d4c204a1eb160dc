//! Core types and traits for the timetravel record store
//!
//! This crate defines the foundational types used throughout the system:
//! - RecordId: Positive external identifier of a record
//! - Sequence: Store-assigned insertion order of a version
//! - Record: One immutable version of a record (data + metadata)
//! - RecordHistory: Non-empty, newest-first list of versions
//! - merge: The pure update merger (null value = delete key)
//! - Error: Error type hierarchy
//! - VersionStore: The storage contract implemented by every backend

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod date;
pub mod error;
pub mod history;
pub mod merge;
pub mod record;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use history::RecordHistory;
pub use merge::{genesis_data, merge};
pub use record::{Record, RecordData, UpdateMap};
pub use traits::VersionStore;
pub use types::{RecordId, Sequence};
