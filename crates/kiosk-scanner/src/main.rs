//! User scanner: entry point.
//!
//! Reads commands from stdin, decodes kiosk QR codes from a frame directory
//! (or from payloads typed with `decode`), and prints where the user is sent.
//!
//! # Usage
//!
//! ```text
//! kiosk-scanner --frontend-url <URL> [OPTIONS]
//!
//! Options:
//!   --frontend-url      <URL>   Public origin of the user web app
//!   --api-url           <URL>   Backend HTTP origin [default: https://kiosk-backend-0y2m.onrender.com/]
//!   --frames            <DIR>   Directory of PNG/JPEG frames used as the camera
//!   --frame-interval-ms <MS>    Pause between decode attempts [default: 500]
//! ```
//!
//! | Variable                  | Flag                  |
//! |---------------------------|-----------------------|
//! | `KIOSK_FRONTEND_URL`      | `--frontend-url`      |
//! | `KIOSK_API_URL`           | `--api-url`           |
//! | `KIOSK_FRAMES_DIR`        | `--frames`            |
//! | `KIOSK_FRAME_INTERVAL_MS` | `--frame-interval-ms` |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use kiosk_core::api::{ApiClient, DEFAULT_API_BASE};
use kiosk_scanner::application::{run_scanner, ScannerController};
use kiosk_scanner::domain::ScannerConfig;
use kiosk_scanner::infrastructure::{ConsoleNavigator, DirectoryCamera, RqrrDecoder};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Kiosk print pairing: user scanner.
#[derive(Debug, Parser)]
#[command(
    name = "kiosk-scanner",
    about = "Scans a kiosk QR code and navigates to its connect page",
    version
)]
struct Cli {
    /// Public origin of the user-facing web app; in-app routes resolve
    /// against it.
    #[arg(long, env = "KIOSK_FRONTEND_URL")]
    frontend_url: String,

    /// Backend HTTP origin.
    #[arg(long, default_value = DEFAULT_API_BASE, env = "KIOSK_API_URL")]
    api_url: String,

    /// Directory of PNG/JPEG frames used as the camera.
    #[arg(long, env = "KIOSK_FRAMES_DIR")]
    frames: Option<PathBuf>,

    /// Pause between two decode attempts while scanning, in milliseconds.
    #[arg(long, default_value_t = 500, env = "KIOSK_FRAME_INTERVAL_MS")]
    frame_interval_ms: u64,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ScannerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is invalid or the frame interval is zero.
    fn into_scanner_config(self) -> anyhow::Result<ScannerConfig> {
        let frontend_origin = Url::parse(&self.frontend_url)
            .with_context(|| format!("invalid frontend URL: '{}'", self.frontend_url))?;
        let api_base = Url::parse(&self.api_url)
            .with_context(|| format!("invalid API URL: '{}'", self.api_url))?;
        if self.frame_interval_ms == 0 {
            anyhow::bail!("--frame-interval-ms must be greater than zero");
        }

        Ok(ScannerConfig {
            frontend_origin,
            api_base,
            frames_dir: self.frames,
            frame_interval: Duration::from_millis(self.frame_interval_ms),
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_scanner_config()?;

    let api = ApiClient::new(config.api_base.clone());
    info!(
        "scanner starting: frontend={}, api={}, frames={}",
        config.frontend_origin,
        api.base(),
        config
            .frames_dir
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    let camera = config.frames_dir.clone().map(DirectoryCamera::new);
    let navigator = ConsoleNavigator::stdout(config.frontend_origin.clone());
    let mut controller = ScannerController::new(camera, RqrrDecoder::new(), navigator, || {
        println!("Logged out.");
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_scanner(&mut controller, stdin, &mut stdout, config.frame_interval).await?;

    info!("scanner stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
