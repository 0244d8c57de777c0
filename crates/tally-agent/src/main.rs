//! # tally-agent
//!
//! Tally server binary. Loads settings, opens the database, wires the Graph
//! client into the HTTP server and runs until Ctrl-C or SIGTERM.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tally_core::logging::init_subscriber;
use tally_graph::GraphClient;
use tally_server::TallyServer;
use tally_settings::{TallySettings, load_settings_from_path, settings_path};
use tally_store::{ConnectionConfig, ContestStore, new_file};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Tally contest server.
#[derive(Parser, Debug)]
#[command(name = "tally", about = "Contest number tally server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Settings file (default: `~/.tally/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `tally_reconcile=trace`.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Load layered settings, then apply command-line overrides.
    fn settings(&self) -> Result<TallySettings> {
        let path = self.config.clone().unwrap_or_else(settings_path);
        let mut settings = load_settings_from_path(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    fn apply_overrides(&self, settings: &mut TallySettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(db_path) = &self.db_path {
            settings.database.path = db_path.to_string_lossy().into_owned();
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Open the database and assemble the server.
fn build_server(settings: TallySettings) -> Result<TallyServer> {
    let db_path = PathBuf::from(&settings.database.path);
    ensure_parent_dir(&db_path)?;

    let config = ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
    };
    let pool = new_file(&settings.database.path, &config).context("Failed to open database")?;
    let store = ContestStore::open(pool).context("Failed to run migrations")?;
    info!(path = %db_path.display(), "database ready");

    let client = GraphClient::new(&settings.graph).context("Failed to build Graph client")?;
    Ok(TallyServer::new(settings, store, Arc::new(client)))
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut term = signal(SignalKind::terminate()).context("Failed to listen for SIGTERM")?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.context("Failed to listen for ctrl-c")?,
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;
    init_subscriber(&settings.logging.level, settings.logging.json);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let server = build_server(settings)?;
    let shutdown = Arc::clone(server.shutdown());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let handle = tokio::spawn(server.serve(listener));

    shutdown_signal().await?;

    info!("Shutting down...");
    if let Some(Err(e)) = shutdown.drain(handle).await {
        error!(error = %e, "server exited with error");
    }
    info!("Shutdown complete");
    Ok(())
}
