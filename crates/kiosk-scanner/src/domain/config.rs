//! Scanner configuration types.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Default pause between two decode attempts while scanning.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(500);

/// All runtime configuration for the user scanner.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Public origin of the user web app; in-app routes resolve against it.
    pub frontend_origin: Url,

    /// Backend HTTP origin handed to the shared API client.
    pub api_base: Url,

    /// Directory of image files used as camera frames.  Without it, scanning
    /// only accepts payloads typed with the `decode` command.
    pub frames_dir: Option<PathBuf>,

    /// Pause between two decode attempts while scanning.
    pub frame_interval: Duration,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
