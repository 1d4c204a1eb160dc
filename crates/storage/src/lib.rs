//! Storage backends for the timetravel record store
//!
//! This crate implements the `VersionStore` contract twice:
//! - MemoryStore: DashMap of per-record version chains, lost on exit
//! - SqliteStore: one table of version rows in a SQLite file
//!
//! Both backends serialize writes per record id and never block
//! operations on different ids against each other.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chain;
pub mod codec;
pub mod locks;
pub mod memory;
pub mod sqlite;

pub use chain::VersionChain;
pub use locks::RecordLocks;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
