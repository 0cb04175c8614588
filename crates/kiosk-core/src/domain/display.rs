//! Kiosk display state and its reducer.
//!
//! [`DisplayState`] is the single record the kiosk screen is drawn from.  It
//! changes only through [`DisplayState::apply`], which accepts one of the four
//! [`DisplayEvent`] variants pushed by the messaging server:
//!
//! | Event            | Effect                                                  |
//! |------------------|---------------------------------------------------------|
//! | `Connected`      | `connected = true`, status = server message, QR hidden  |
//! | `FileReceived`   | remember the file, status names it                      |
//! | `PrintRequested` | remember settings, status describes copies/color        |
//! | `PrintCompleted` | status = server message, file and settings cleared      |
//!
//! The reducer has no knowledge of the transport: the same sequence of
//! events always produces the same state.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::kiosk_id::KioskId;
use crate::links::join_url;

/// Status text shown while waiting for the first user to pair.
pub const IDLE_STATUS: &str = "Waiting for user to scan QR...";

/// Status text of the terminal "no identifier" state.
pub const MISSING_ID_STATUS: &str = "No kioskId found";

/// Title drawn at the top of the kiosk screen.
pub const DISPLAY_TITLE: &str = "Kiosk Dashboard";

/// Metadata of the file a paired user uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Original file name as reported by the server.
    pub filename: String,
    /// File size in bytes, when the server knows it.
    ///
    /// Any JSON number or numeric string is accepted and rounded to whole
    /// bytes; anything else reads as unknown.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "loose_size"
    )]
    pub size: Option<u64>,
}

impl FileInfo {
    /// Human-readable size, e.g. `"1.50 KB"`, or `"Unknown"` when absent.
    ///
    /// A zero size is reported as `"Unknown"` as well; the server sends `0`
    /// when it did not measure the upload.
    pub fn size_label(&self) -> String {
        match self.size {
            Some(bytes) if bytes > 0 => format!("{:.2} KB", bytes as f64 / 1024.0),
            _ => "Unknown".to_string(),
        }
    }
}

/// Print options chosen by the paired user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSettings {
    /// Number of copies to print.  Form inputs often send it as a string,
    /// so `"2"` is read the same as `2`.
    #[serde(deserialize_with = "loose_copies")]
    pub copies: u32,
    /// Color mode label (e.g. `"color"`, `"bw"`), displayed verbatim.
    pub color: String,
}

/// A number as loosely typed web clients send it.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(u64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    /// Rounds to a non-negative whole number, if the value is one.
    fn to_whole(&self) -> Option<u64> {
        let value = match self {
            Self::Int(n) => return Some(*n),
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value >= 0.0 && value <= u64::MAX as f64).then(|| value.round() as u64)
    }
}

fn loose_copies<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = LooseNumber::deserialize(deserializer)?;
    raw.to_whole()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| de::Error::custom("copies is not a whole number of copies"))
}

fn loose_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|v| LooseNumber::deserialize(v).ok())
        .and_then(|n| n.to_whole()))
}

/// Closed set of events the kiosk display reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// A user session paired with this kiosk.
    Connected {
        /// Server-supplied confirmation text.
        message: String,
    },
    /// The paired user uploaded a file.
    FileReceived(FileInfo),
    /// The paired user asked for the file to be printed.
    PrintRequested(PrintSettings),
    /// The print job finished.
    PrintCompleted {
        /// Server-supplied completion text.
        status: String,
    },
}

impl DisplayEvent {
    /// Short variant name for log messages (no payload contents).
    pub fn kind(&self) -> &'static str {
        match self {
            DisplayEvent::Connected { .. } => "Connected",
            DisplayEvent::FileReceived(_) => "FileReceived",
            DisplayEvent::PrintRequested(_) => "PrintRequested",
            DisplayEvent::PrintCompleted { .. } => "PrintCompleted",
        }
    }
}

/// Everything the kiosk screen shows, as one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// Resolved kiosk identifier; `None` only in the terminal error state.
    pub kiosk_id: Option<KioskId>,
    /// `true` once a user has paired; hides the join QR code.
    pub connected: bool,
    /// Human-readable status line.
    pub status: String,
    /// Last uploaded file, until the print completes.
    pub file_info: Option<FileInfo>,
    /// Requested print options, until the print completes.
    pub print_settings: Option<PrintSettings>,
}

impl DisplayState {
    /// Initial state for a resolved kiosk: idle, unpaired, QR visible.
    pub fn idle(kiosk_id: KioskId) -> Self {
        Self {
            kiosk_id: Some(kiosk_id),
            connected: false,
            status: IDLE_STATUS.to_string(),
            file_info: None,
            print_settings: None,
        }
    }

    /// Terminal error state used when no kiosk identifier could be resolved.
    pub fn missing_id() -> Self {
        Self {
            kiosk_id: None,
            connected: false,
            status: MISSING_ID_STATUS.to_string(),
            file_info: None,
            print_settings: None,
        }
    }

    /// Returns `true` for the state built by [`DisplayState::missing_id`].
    pub fn is_terminal_error(&self) -> bool {
        self.kiosk_id.is_none()
    }

    /// Applies one event to the state.
    ///
    /// Events delivered to the terminal error state are ignored: without an
    /// identifier there is no channel they could legitimately come from.
    pub fn apply(&mut self, event: DisplayEvent) {
        if self.is_terminal_error() {
            debug!("ignoring {} event: no kiosk id", event.kind());
            return;
        }

        match event {
            DisplayEvent::Connected { message } => {
                self.connected = true;
                self.status = message;
            }
            DisplayEvent::FileReceived(file) => {
                self.status = format!("File received: {}", file.filename);
                self.file_info = Some(file);
            }
            DisplayEvent::PrintRequested(settings) => {
                // The currently stored file is used, not whatever was stored
                // when the connection was opened.
                let filename = self
                    .file_info
                    .as_ref()
                    .map(|f| f.filename.as_str())
                    .unwrap_or("file");
                self.status = format!(
                    "Printing {filename} ({} copies, {})",
                    settings.copies, settings.color
                );
                self.print_settings = Some(settings);
            }
            DisplayEvent::PrintCompleted { status } => {
                self.status = status;
                self.file_info = None;
                self.print_settings = None;
            }
        }
    }

    /// Returns `true` while the join QR code should be shown.
    pub fn shows_join_code(&self) -> bool {
        !self.connected && self.kiosk_id.is_some()
    }

    /// Builds the renderable view of this state.
    ///
    /// `frontend_origin` is the public origin of the user-facing web app; the
    /// QR payload points at its connect page.
    pub fn view(&self, frontend_origin: &Url) -> DisplayView {
        let join_code = match (&self.kiosk_id, self.shows_join_code()) {
            (Some(id), true) => Some(JoinCode {
                payload: join_url(frontend_origin, id).to_string(),
                footer: format!("Kiosk ID: {id}"),
            }),
            _ => None,
        };

        DisplayView {
            title: DISPLAY_TITLE,
            status: self.status.clone(),
            join_code,
            file: self.file_info.as_ref().map(|f| FileBox {
                filename: f.filename.clone(),
                size_label: f.size_label(),
            }),
            print: self.print_settings.as_ref().map(|p| PrintBox {
                color: p.color.clone(),
                copies: p.copies,
            }),
        }
    }
}

/// Renderable snapshot of a [`DisplayState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayView {
    pub title: &'static str,
    pub status: String,
    /// Present only while idle with a resolved identifier.
    pub join_code: Option<JoinCode>,
    pub file: Option<FileBox>,
    pub print: Option<PrintBox>,
}

/// QR payload plus the caption drawn under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCode {
    pub payload: String,
    pub footer: String,
}

/// "File Received" panel contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBox {
    pub filename: String,
    pub size_label: String,
}

/// "Print Settings" panel contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintBox {
    pub color: String,
    pub copies: u32,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
