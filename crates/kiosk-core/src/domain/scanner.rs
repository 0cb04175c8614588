//! User scanner state machine.
//!
//! The scanner screen has two modes:
//!
//! ```text
//!          start_scan()
//!   Idle ───────────────> Scanning
//!    ^  <─────────────── │  │
//!    │      cancel()     │  │ on_decode(Err)  (logged, keeps scanning)
//!    │                   │<─┘
//!    └───────────────────┘
//!       on_decode(Ok(text))  → ScanEffect::Redirect / ScanEffect::Route
//! ```
//!
//! Decoded frames arrive from a camera loop that is not synchronised with
//! user input.  A decode result that arrives after the user cancelled (or
//! after a successful scan already switched back to idle) is discarded, so
//! one QR code never triggers two navigations.

use thiserror::Error;
use tracing::{debug, info};

use crate::links::{absolute_web_url, connect_route};

/// Why a single frame did not yield a payload.
///
/// Decode errors are expected on most frames (no code in view, motion blur)
/// and never stop scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No QR code was found in the frame.
    #[error("no QR code in frame")]
    NoCode,
    /// A code was found but its data could not be read.
    #[error("QR code could not be read: {0}")]
    Unreadable(String),
    /// The frame itself could not be obtained or converted.
    #[error("frame unavailable: {0}")]
    Frame(String),
}

/// Which screen the scanner is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Welcome screen with "scan" and "logout" actions.
    #[default]
    Idle,
    /// Camera active, decoding frames.
    Scanning,
}

/// Side effect requested by a state transition, executed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEffect {
    /// Full navigation to an absolute URL found in the QR code.
    Redirect(String),
    /// In-app transition to the connect page (route includes the query).
    Route(String),
    /// Hand control to the external logout callback.
    Logout,
}

/// Scanner mode plus the last successful scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerState {
    pub mode: ScanMode,
    /// Text of the most recent successful decode.
    pub scan_result: Option<String>,
}

impl ScannerState {
    /// Creates an idle scanner with no previous result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while the camera loop should be running.
    pub fn is_scanning(&self) -> bool {
        self.mode == ScanMode::Scanning
    }

    /// Switches to scanning mode.  Calling it while already scanning is a no-op.
    pub fn start_scan(&mut self) {
        if !self.is_scanning() {
            debug!("scanner: idle -> scanning");
            self.mode = ScanMode::Scanning;
        }
    }

    /// Returns to idle mode.  The previous `scan_result` is kept.
    pub fn cancel(&mut self) {
        if self.is_scanning() {
            debug!("scanner: scanning -> idle (cancelled)");
            self.mode = ScanMode::Idle;
        }
    }

    /// Requests logout.  Only offered on the idle screen.
    pub fn logout(&self) -> Option<ScanEffect> {
        match self.mode {
            ScanMode::Idle => Some(ScanEffect::Logout),
            ScanMode::Scanning => None,
        }
    }

    /// Handles one decode attempt from the camera loop.
    ///
    /// Returns the navigation to perform after a successful decode, or `None`
    /// when the result was an error or arrived outside scanning mode.
    pub fn on_decode(&mut self, result: Result<String, DecodeError>) -> Option<ScanEffect> {
        if !self.is_scanning() {
            debug!("scanner: discarding decode result received while idle");
            return None;
        }

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                debug!("scanner: decode attempt failed: {e}");
                return None;
            }
        };

        info!("scanner: decoded payload ({} bytes)", text.len());
        self.mode = ScanMode::Idle;

        let effect = if absolute_web_url(&text).is_some() {
            ScanEffect::Redirect(text.clone())
        } else {
            ScanEffect::Route(connect_route(&text))
        };
        self.scan_result = Some(text);
        Some(effect)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scanning() -> ScannerState {
        let mut state = ScannerState::new();
        state.start_scan();
        state
    }

    #[test]
    fn test_new_scanner_is_idle_without_result() {
        let state = ScannerState::new();
        assert_eq!(state.mode, ScanMode::Idle);
        assert!(state.scan_result.is_none());
    }

    #[test]
    fn test_start_scan_enters_scanning() {
        assert_eq!(scanning().mode, ScanMode::Scanning);
    }

    #[test]
    fn test_url_payload_redirects_to_exact_url() {
        // Arrange
        let mut state = scanning();

        // Act
        let effect = state.on_decode(Ok("http://example.com/x".to_string()));

        // Assert
        assert_eq!(
            effect,
            Some(ScanEffect::Redirect("http://example.com/x".to_string()))
        );
        assert_eq!(state.mode, ScanMode::Idle);
    }

    #[test]
    fn test_identifier_payload_routes_to_connect() {
        let mut state = scanning();
        let effect = state.on_decode(Ok("KIOSK-42".to_string()));
        assert_eq!(
            effect,
            Some(ScanEffect::Route("/connect?kioskId=KIOSK-42".to_string()))
        );
        assert_eq!(state.scan_result.as_deref(), Some("KIOSK-42"));
    }

    #[test]
    fn test_identifier_with_reserved_characters_is_encoded() {
        let mut state = scanning();
        let effect = state.on_decode(Ok("K 1/2?".to_string()));
        assert_eq!(
            effect,
            Some(ScanEffect::Route("/connect?kioskId=K+1%2F2%3F".to_string()))
        );
    }

    #[test]
    fn test_decode_error_keeps_scanning() {
        let mut state = scanning();
        let effect = state.on_decode(Err(DecodeError::NoCode));
        assert!(effect.is_none());
        assert!(state.is_scanning());
        assert!(state.scan_result.is_none());
    }

    #[test]
    fn test_cancel_keeps_previous_scan_result() {
        // Arrange: a successful scan, then a second scan that is cancelled.
        let mut state = scanning();
        state.on_decode(Ok("K1".to_string()));
        state.start_scan();

        // Act
        state.cancel();

        // Assert
        assert_eq!(state.mode, ScanMode::Idle);
        assert_eq!(state.scan_result.as_deref(), Some("K1"));
    }

    #[test]
    fn test_decode_after_cancel_is_discarded() {
        let mut state = scanning();
        state.cancel();

        let effect = state.on_decode(Ok("K2".to_string()));

        assert!(effect.is_none());
        assert!(state.scan_result.is_none());
    }

    #[test]
    fn test_second_decode_of_same_code_is_discarded() {
        let mut state = scanning();
        assert!(state.on_decode(Ok("K1".to_string())).is_some());
        // The camera loop may still deliver the same code once more.
        assert!(state.on_decode(Ok("K1".to_string())).is_none());
    }

    #[test]
    fn test_logout_only_offered_when_idle() {
        let mut state = ScannerState::new();
        assert_eq!(state.logout(), Some(ScanEffect::Logout));
        state.start_scan();
        assert_eq!(state.logout(), None);
    }

    #[test]
    fn test_logout_does_not_change_state() {
        let state = ScannerState {
            mode: ScanMode::Idle,
            scan_result: Some("K1".to_string()),
        };
        let before = state.clone();
        let _ = state.logout();
        assert_eq!(state, before);
    }
}
