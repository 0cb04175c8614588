//! Text of the scanner screen.

use kiosk_core::{ScanMode, ScannerState};

/// Title drawn at the top of the scanner screen.
pub const SCANNER_TITLE: &str = "User Dashboard";

/// Builds the screen for `state`.
///
/// `has_camera` selects the scanning hint: without a camera the user feeds
/// payloads with `decode`.
pub fn render_screen(state: &ScannerState, has_camera: bool) -> String {
    let mut out = format!("=== {SCANNER_TITLE} ===\n\n");
    match state.mode {
        ScanMode::Idle => {
            out.push_str("Welcome! Scan the QR code displayed on your kiosk machine.\n\n");
            out.push_str("Commands: scan, logout, quit\n");
            out.push_str("Camera permission is required to scan QR codes.\n");
            if let Some(result) = &state.scan_result {
                out.push_str(&format!("\nScanned: {result}\n"));
            }
        }
        ScanMode::Scanning => {
            out.push_str("Scanning...\n\n");
            if has_camera {
                out.push_str("Commands: cancel, quit\n");
            } else {
                out.push_str("No camera configured; type 'decode <payload>' to feed a code.\n");
                out.push_str("Commands: decode <payload>, cancel, quit\n");
            }
        }
    }
    out
}

/// Help text for the `help` command.
pub const HELP: &str = "\
scan              start scanning for a kiosk QR code
cancel            stop scanning
logout            sign out (idle screen only)
decode <payload>  feed a QR payload as if the camera read it
help              show this help
quit              exit";

// ── Tests ─────────────────────────────────────────────────────────────────────
