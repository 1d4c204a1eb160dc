//! Server configuration via `timetravel.toml`
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration. Command-line flags are applied on top (see `cli`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use timetravel_service::{StorageKind, UnknownStorageKind};

/// Config file looked up in the working directory when `--config` is absent
pub const CONFIG_FILE_NAME: &str = "timetravel.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config file '{path}': {reason}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// File is not valid TOML for `ServerConfig`
    #[error("failed to parse config file '{path}': {reason}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Storage type is neither sqlite nor memory
    #[error(transparent)]
    Storage(#[from] UnknownStorageKind),

    /// `request_timeout_ms` is zero
    #[error("request_timeout_ms must be greater than 0")]
    ZeroTimeout,
}

/// Server configuration loaded from `timetravel.toml`
///
/// # Example
///
/// ```toml
/// storage = "sqlite"
/// sqlite_path = "./data/data.db"
/// listen = "127.0.0.1:8000"
/// request_timeout_ms = 15000
/// log_filter = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Storage backend: `"sqlite"` or `"memory"`
    #[serde(default = "default_storage")]
    pub storage: String,
    /// SQLite database file (ignored by the memory backend)
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
    /// Socket address to bind
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Deadline for a single request in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_storage() -> String {
    StorageKind::default().to_string()
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./data/data.db")
}

fn default_listen() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            sqlite_path: default_sqlite_path(),
            listen: default_listen(),
            request_timeout_ms: default_request_timeout_ms(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    /// Parse the storage string into a `StorageKind`
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"sqlite"` or `"memory"`.
    pub fn storage_kind(&self) -> Result<StorageKind, ConfigError> {
        Ok(self.storage.parse()?)
    }

    /// Check every field that has a restricted range
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown storage type or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage_kind()?;
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Request deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# timetravel server configuration
#
# Storage backend: "sqlite" (default) or "memory"
#   "sqlite" = history kept in sqlite_path, survives restarts
#   "memory" = history lost on exit
storage = "sqlite"
sqlite_path = "./data/data.db"

# Address to listen on
listen = "127.0.0.1:8000"

# Per-request deadline in milliseconds
request_timeout_ms = 15000

# Log filter (RUST_LOG takes precedence)
log_filter = "info"
"#
    }

    /// Read and parse config from a file path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// `validate`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: ServerConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or `timetravel.toml` if present
    ///
    /// An explicit path must exist. Without one, a missing
    /// `timetravel.toml` means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_sqlite_on_localhost() {
        let config = ServerConfig::default();
        assert_eq!(config.storage_kind().unwrap(), StorageKind::Sqlite);
        assert_eq!(config.sqlite_path, PathBuf::from("./data/data.db"));
        assert_eq!(config.listen, "127.0.0.1:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn default_toml_parses_to_defaults() {
        let config: ServerConfig = toml::from_str(ServerConfig::default_toml()).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: ServerConfig =
            toml::from_str("storage = \"memory\"\nrequest_timeout_ms = 250\n").unwrap();
        assert_eq!(config.storage_kind().unwrap(), StorageKind::Memory);
        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.listen, "127.0.0.1:8000");
    }

    #[test]
    fn invalid_storage_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "storage = \"postgres\"\n").unwrap();

        assert!(matches!(
            ServerConfig::from_file(&path),
            Err(ConfigError::Storage(_))
        ));
    }

    #[test]
    fn zero_timeout_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "request_timeout_ms = 0\n").unwrap();

        assert!(matches!(
            ServerConfig::from_file(&path),
            Err(ConfigError::ZeroTimeout)
        ));
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(ServerConfig::default().validate().is_ok());

        let config = ServerConfig {
            request_timeout_ms: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "request_timeout_ms = \"soon\"\n").unwrap();

        assert!(matches!(
            ServerConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            ServerConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "listen = \"0.0.0.0:9000\"\n").unwrap();

        let config = ServerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.storage, "sqlite");
    }
}
