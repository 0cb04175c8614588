//! Display configuration types.
//!
//! [`DisplayConfig`] holds every runtime setting of the kiosk display.  The
//! binary fills it from CLI arguments and environment variables; tests build
//! it directly.  Nothing in here reads the environment.

use std::path::PathBuf;
use std::time::Duration;

use kiosk_core::api::ApiClient;
use kiosk_core::QueryParams;
use url::Url;

/// Default bound on the channel handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// All runtime configuration for the kiosk display.
///
/// # Example
///
/// ```rust
/// use kiosk_display::domain::DisplayConfig;
/// use url::Url;
///
/// let cfg = DisplayConfig::new(
///     Url::parse("https://print.example.com").unwrap(),
///     Url::parse("https://socket.example.com").unwrap(),
/// );
/// assert!(cfg.query.is_empty());
/// assert_eq!(cfg.connect_timeout.as_secs(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Public origin of the user-facing web app.  The QR code points at its
    /// `/connect` page.
    pub frontend_origin: Url,

    /// Origin of the real-time messaging server.
    pub socket_origin: Url,

    /// Backend HTTP origin handed to the shared API client.
    pub api_base: Url,

    /// Launch query parameters (`kioskId=...`).  A `kioskId` here wins over
    /// the stored one and replaces it.
    pub query: QueryParams,

    /// Location of the key-value file.  `None` selects the platform default.
    pub storage_path: Option<PathBuf>,

    /// Upper bound on the channel handshake (WebSocket upgrade, Engine.IO
    /// open, Socket.IO connect).
    pub connect_timeout: Duration,
}

impl DisplayConfig {
    /// Creates a configuration with an empty query, the default backend
    /// origin, the platform storage path and the default connect timeout.
    pub fn new(frontend_origin: Url, socket_origin: Url) -> Self {
        Self {
            frontend_origin,
            socket_origin,
            api_base: ApiClient::default_base(),
            query: QueryParams::default(),
            storage_path: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
