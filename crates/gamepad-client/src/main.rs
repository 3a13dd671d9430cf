//! Remote Gamepad client — entry point.
//!
//! Connects the gamepad link supervisor to a running gamepad server over
//! WebSocket, logs every state transition, and plays inbound vibration
//! commands through the logging haptic sink. Input events come from the
//! embedding application through the [`GamepadLink`] handle; this binary
//! exists to run the link standalone for development and smoke testing.
//!
//! # Usage
//!
//! ```text
//! gamepad-client [OPTIONS]
//!
//! Options:
//!   --host   <HOST>   Gamepad server hostname or IP [default: persisted or 127.0.0.1]
//!   --port   <PORT>   Gamepad server port           [default: persisted or 8000]
//!   --config <PATH>   Settings file path override
//! ```
//!
//! CLI args and their environment fallbacks (`GAMEPAD_HOST`, `GAMEPAD_PORT`)
//! take precedence over the persisted settings; the persisted settings are
//! used when neither is given. Endpoint changes made at runtime via
//! `set_endpoint` are written back to the settings file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gamepad_client::domain::config::ConnectionConfig;
use gamepad_client::infrastructure::haptics::LogHaptics;
use gamepad_client::infrastructure::network::WsConnector;
use gamepad_client::infrastructure::storage::{SettingsStore, TomlSettingsStore};
use gamepad_client::{GamepadLink, LinkOptions};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Remote Gamepad WebSocket client.
#[derive(Debug, Parser)]
#[command(
    name = "gamepad-client",
    about = "Streams gamepad input to a remote server over WebSocket",
    version
)]
struct Cli {
    /// Hostname or IP address of the gamepad server.
    ///
    /// Overrides the persisted setting; when absent, the last-used host is
    /// loaded from the settings file.
    #[arg(long, env = "GAMEPAD_HOST")]
    host: Option<String>,

    /// TCP port of the gamepad server's WebSocket endpoint.
    #[arg(long, env = "GAMEPAD_PORT")]
    port: Option<u16>,

    /// Settings file path, replacing the platform config location.
    #[arg(long, env = "GAMEPAD_CONFIG")]
    config: Option<PathBuf>,
}

/// Resolves the effective endpoint: persisted settings first, then CLI and
/// environment overrides on top.
fn resolve_config(cli: &Cli, store: &dyn SettingsStore) -> ConnectionConfig {
    let mut config = match store.load() {
        Ok(Some(persisted)) => persisted,
        Ok(None) => ConnectionConfig::default(),
        Err(e) => {
            warn!("could not load persisted settings: {e}; using defaults");
            ConnectionConfig::default()
        }
    };
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let store: Arc<dyn SettingsStore> = match &cli.config {
        Some(path) => Arc::new(TomlSettingsStore::at(path.clone())),
        None => Arc::new(TomlSettingsStore::default()),
    };
    let config = resolve_config(&cli, store.as_ref());

    info!(host = %config.host, port = config.port, "remote gamepad client starting");

    let (link, supervisor_task) = GamepadLink::start(LinkOptions {
        config,
        connector: Arc::new(WsConnector),
        haptics: Arc::new(LogHaptics),
        store: Some(store),
    });

    // Log every committed state transition until the supervisor exits.
    let mut status = link.subscribe();
    let status_task = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let snapshot = status.borrow_and_update().clone();
            match &snapshot.last_error {
                Some(error) => info!(state = ?snapshot.state, %error, "link state"),
                None => info!(state = ?snapshot.state, "link state"),
            }
        }
    });

    link.connect();

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C; shutting down"),
        Err(e) => warn!("failed to listen for Ctrl+C signal: {e}"),
    }

    link.shutdown();
    supervisor_task.await?;
    status_task.abort();

    info!("remote gamepad client stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
