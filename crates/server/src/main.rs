//! timetravel server
//!
//! Usage:
//!   timetravel --storage-type sqlite --db ./data/data.db --listen 127.0.0.1:8000

use anyhow::{Context, Result};
use tracing::info;

use timetravel_server::{cli, router, telemetry, AppState};
use timetravel_service::{open_store, RecordService};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    if matches.get_flag("print-config") {
        print!("{}", timetravel_server::ServerConfig::default_toml());
        return Ok(());
    }

    let config = cli::resolve_config(&matches).context("invalid configuration")?;
    telemetry::init(&config.log_filter);

    let kind = config.storage_kind()?;
    let store = open_store(kind, &config.sqlite_path)
        .with_context(|| format!("failed to open {} storage", kind))?;
    let state = AppState::new(RecordService::new(store), config.request_timeout());

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!(
        target: "timetravel::http",
        addr = %config.listen,
        storage = %kind,
        "listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!(target: "timetravel::http", "shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(target: "timetravel::http", error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
