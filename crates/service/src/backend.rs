//! Backend selection
//!
//! Maps the configured storage type (`"sqlite"` or `"memory"`) to a shared
//! `VersionStore` instance.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use timetravel_core::{Result, VersionStore};
use timetravel_storage::{MemoryStore, SqliteStore};

/// Storage backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// SQLite file; history survives restarts
    #[default]
    Sqlite,
    /// Process memory; history is lost on exit
    Memory,
}

impl StorageKind {
    /// Name as accepted on the command line and in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Sqlite => "sqlite",
            StorageKind::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized storage type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid storage type '{0}'; expected \"sqlite\" or \"memory\"")]
pub struct UnknownStorageKind(pub String);

impl FromStr for StorageKind {
    type Err = UnknownStorageKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageKind::Sqlite),
            "memory" => Ok(StorageKind::Memory),
            _ => Err(UnknownStorageKind(s.to_string())),
        }
    }
}

/// Open the store for `kind`
///
/// `sqlite_path` is only used by the SQLite backend.
///
/// # Errors
///
/// Returns `StorageUnavailable` if the SQLite file cannot be opened.
pub fn open_store(
    kind: StorageKind,
    sqlite_path: impl AsRef<Path>,
) -> Result<Arc<dyn VersionStore>> {
    let store: Arc<dyn VersionStore> = match kind {
        StorageKind::Memory => Arc::new(MemoryStore::new()),
        StorageKind::Sqlite => Arc::new(SqliteStore::open(sqlite_path)?),
    };
    info!(target: "timetravel::service", backend = store.backend_name(), "storage ready");
    Ok(store)
}
