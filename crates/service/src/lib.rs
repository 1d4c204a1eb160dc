//! Record service for timetravel
//!
//! The facade every request handler talks to. It owns a shared
//! `VersionStore`, validates ids, and implements the upsert policy
//! (create on first write, merge afterwards).
//!
//! # Example
//!
//! ```ignore
//! use timetravel_service::{open_store, RecordService, StorageKind};
//!
//! let store = open_store(StorageKind::Memory, "./data/data.db")?;
//! let service = RecordService::new(store);
//! service.upsert(1, updates, None)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod service;

pub use backend::{open_store, StorageKind, UnknownStorageKind};
pub use service::RecordService;
