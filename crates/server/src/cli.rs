//! Command-line definition
//!
//! Flags override values from the config file.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::config::{ConfigError, ServerConfig};

/// Build the command-line definition
pub fn build_cli() -> Command {
    Command::new("timetravel")
        .about("HTTP service storing the full version history of records")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Config file (default: ./timetravel.toml if present)"),
        )
        .arg(
            Arg::new("storage-type")
                .long("storage-type")
                .alias("storage_type")
                .value_name("TYPE")
                .value_parser(["sqlite", "memory"])
                .help("Storage backend: sqlite or memory (default: sqlite)"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .help("SQLite database file (default: ./data/data.db)"),
        )
        .arg(
            Arg::new("listen")
                .long("listen")
                .value_name("ADDR")
                .help("Address to listen on (default: 127.0.0.1:8000)"),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .help("Print the default config file and exit")
                .action(ArgAction::SetTrue),
        )
}

/// Load the config file named by `--config` and apply flag overrides
pub fn resolve_config(matches: &ArgMatches) -> Result<ServerConfig, ConfigError> {
    let explicit = matches.get_one::<String>("config").map(PathBuf::from);
    let config = ServerConfig::load(explicit.as_deref())?;
    apply_overrides(config, matches)
}

/// Apply command-line overrides to a loaded config
pub fn apply_overrides(
    mut config: ServerConfig,
    matches: &ArgMatches,
) -> Result<ServerConfig, ConfigError> {
    if let Some(storage) = matches.get_one::<String>("storage-type") {
        config.storage = storage.clone();
    }
    if let Some(db) = matches.get_one::<String>("db") {
        config.sqlite_path = PathBuf::from(db);
    }
    if let Some(listen) = matches.get_one::<String>("listen") {
        config.listen = listen.clone();
    }
    config.validate()?;
    Ok(config)
}
