//! Kiosk display: entry point.
//!
//! Shows the kiosk's join QR code in the terminal and follows the pairing and
//! print events the messaging server pushes to the kiosk's channel.
//!
//! # Usage
//!
//! ```text
//! kiosk-display --frontend-url <URL> --socket-url <URL> [OPTIONS]
//!
//! Options:
//!   --frontend-url    <URL>   Public origin of the user web app (QR target)
//!   --socket-url      <URL>   Messaging server origin
//!   --api-url         <URL>   Backend HTTP origin [default: https://kiosk-backend-0y2m.onrender.com/]
//!   --query           <QS>    Launch query string, e.g. "?kioskId=LOBBY-1"
//!   --kiosk-id        <ID>    Shorthand for --query "kioskId=<ID>"
//!   --storage-path    <PATH>  Key-value file [default: <config dir>/kiosk-print/storage.toml]
//!   --connect-timeout <SECS>  Channel handshake bound [default: 10]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                | Flag                |
//! |-------------------------|---------------------|
//! | `KIOSK_FRONTEND_URL`    | `--frontend-url`    |
//! | `KIOSK_SOCKET_URL`      | `--socket-url`      |
//! | `KIOSK_API_URL`         | `--api-url`         |
//! | `KIOSK_QUERY`           | `--query`           |
//! | `KIOSK_ID`              | `--kiosk-id`        |
//! | `KIOSK_STORAGE_PATH`    | `--storage-path`    |
//! | `KIOSK_CONNECT_TIMEOUT` | `--connect-timeout` |
//!
//! CLI args take precedence when both are present.  Logs go to stderr
//! (`RUST_LOG` controls the level); the screen goes to stdout.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use kiosk_core::api::{ApiClient, DEFAULT_API_BASE};
use kiosk_core::QueryParams;
use kiosk_display::application::run_display;
use kiosk_display::domain::DisplayConfig;
use kiosk_display::infrastructure::{FileStore, TerminalRenderer};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Kiosk print pairing display.
#[derive(Debug, Parser)]
#[command(
    name = "kiosk-display",
    about = "Shows the kiosk join QR code and follows pairing and print events",
    version
)]
struct Cli {
    /// Public origin of the user-facing web app.  The QR code points at its
    /// `/connect` page.
    #[arg(long, env = "KIOSK_FRONTEND_URL")]
    frontend_url: String,

    /// Origin of the real-time messaging server.
    #[arg(long, env = "KIOSK_SOCKET_URL")]
    socket_url: String,

    /// Backend HTTP origin.
    #[arg(long, default_value = DEFAULT_API_BASE, env = "KIOSK_API_URL")]
    api_url: String,

    /// Launch query string, e.g. `?kioskId=LOBBY-1`.
    #[arg(long, env = "KIOSK_QUERY")]
    query: Option<String>,

    /// Kiosk identifier; takes precedence over a `kioskId` in `--query`.
    #[arg(long, env = "KIOSK_ID")]
    kiosk_id: Option<String>,

    /// Path of the key-value file that remembers the kiosk id.
    #[arg(long, env = "KIOSK_STORAGE_PATH")]
    storage_path: Option<PathBuf>,

    /// Upper bound on the channel handshake, in seconds.
    #[arg(long, default_value_t = 10, env = "KIOSK_CONNECT_TIMEOUT")]
    connect_timeout: u64,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`DisplayConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if any of the URLs is not a valid absolute URL.
    fn into_display_config(self) -> anyhow::Result<DisplayConfig> {
        let frontend_origin = Url::parse(&self.frontend_url)
            .with_context(|| format!("invalid frontend URL: '{}'", self.frontend_url))?;
        let socket_origin = Url::parse(&self.socket_url)
            .with_context(|| format!("invalid messaging server URL: '{}'", self.socket_url))?;
        let api_base = Url::parse(&self.api_url)
            .with_context(|| format!("invalid API URL: '{}'", self.api_url))?;

        let mut query = self
            .query
            .as_deref()
            .map(QueryParams::parse)
            .unwrap_or_default();
        if let Some(id) = self.kiosk_id.filter(|id| !id.trim().is_empty()) {
            // An explicit id goes first so it wins over the query string.
            // A blank one is ignored.
            let mut explicit = QueryParams::default();
            explicit.push(kiosk_core::KIOSK_ID_KEY, id);
            for (key, value) in query.iter() {
                explicit.push(key, value);
            }
            query = explicit;
        }

        Ok(DisplayConfig {
            frontend_origin,
            socket_origin,
            api_base,
            query,
            storage_path: self.storage_path,
            connect_timeout: Duration::from_secs(self.connect_timeout),
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with the rendered screen.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_display_config()?;

    let api = ApiClient::new(config.api_base.clone());
    info!(
        "kiosk display starting: frontend={}, socket={}, api={}",
        config.frontend_origin,
        config.socket_origin,
        api.base()
    );

    let mut store = match &config.storage_path {
        Some(path) => FileStore::open(path),
        None => FileStore::open_default(),
    }
    .context("failed to open kiosk storage")?;
    info!("kiosk storage: {}", store.path().display());

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C; shutting down"),
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    let state = run_display(&config, &mut store, TerminalRenderer::stdout(), shutdown).await?;

    info!("kiosk display stopped (last status: {})", state.status);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
