//! Named events exchanged on the kiosk channel.
//!
//! The event names and payload shapes are owned by the messaging server; this
//! module only mirrors them.
//!
//! | Direction        | Name                   | Payload                              |
//! |------------------|------------------------|--------------------------------------|
//! | kiosk → server   | `join_kiosk`           | kiosk id (string)                    |
//! | server → kiosk   | `userConnectedMessage` | message (string)                     |
//! | server → kiosk   | `fileReceived`         | `{"filename": str, "size"?: number}` |
//! | server → kiosk   | `printFile`            | `{"copies": int or str, "color": str}` |
//! | server → kiosk   | `printStatus`          | `{"status": str}`                    |

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::display::{DisplayEvent, FileInfo, PrintSettings};
use crate::domain::kiosk_id::KioskId;
use crate::protocol::packet::{EnginePacket, SocketPacket};

/// Outbound event announcing which kiosk channel to join.
pub const JOIN_KIOSK: &str = "join_kiosk";
/// A user session paired with the kiosk.
pub const USER_CONNECTED: &str = "userConnectedMessage";
/// The paired user uploaded a file.
pub const FILE_RECEIVED: &str = "fileReceived";
/// The paired user requested a print.
pub const PRINT_FILE: &str = "printFile";
/// The print job finished.
pub const PRINT_STATUS: &str = "printStatus";

/// Errors raised when a known event carries an unusable payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The event arrived without any argument.
    #[error("event {event} has no payload")]
    MissingPayload { event: &'static str },

    /// The first argument does not have the expected shape.
    #[error("event {event} has an invalid payload: {reason}")]
    InvalidPayload { event: &'static str, reason: String },
}

#[derive(Deserialize)]
struct PrintStatusPayload {
    status: String,
}

/// Maps a named server event onto a [`DisplayEvent`].
///
/// Returns `Ok(None)` for event names the kiosk does not react to, so new
/// server events never break an older display.
///
/// # Errors
///
/// Returns [`EventError`] when a known event carries a missing or malformed
/// payload.
///
/// # Example
///
/// ```rust
/// use kiosk_core::{decode_display_event, DisplayEvent};
/// use serde_json::json;
///
/// let event = decode_display_event("printStatus", &[json!({"status": "Done"})]).unwrap();
/// assert_eq!(event, Some(DisplayEvent::PrintCompleted { status: "Done".into() }));
/// ```
pub fn decode_display_event(name: &str, args: &[Value]) -> Result<Option<DisplayEvent>, EventError> {
    let event = match name {
        USER_CONNECTED => {
            let message: String = first_arg(USER_CONNECTED, args)?;
            DisplayEvent::Connected { message }
        }
        FILE_RECEIVED => DisplayEvent::FileReceived(first_arg::<FileInfo>(FILE_RECEIVED, args)?),
        PRINT_FILE => DisplayEvent::PrintRequested(first_arg::<PrintSettings>(PRINT_FILE, args)?),
        PRINT_STATUS => {
            let payload: PrintStatusPayload = first_arg(PRINT_STATUS, args)?;
            DisplayEvent::PrintCompleted {
                status: payload.status,
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

/// Builds the `join_kiosk` packet sent right after the channel opens.
pub fn join_packet(kiosk_id: &KioskId) -> EnginePacket {
    EnginePacket::Message(SocketPacket::event(
        JOIN_KIOSK,
        vec![Value::String(kiosk_id.as_str().to_string())],
    ))
}

fn first_arg<T: DeserializeOwned>(event: &'static str, args: &[Value]) -> Result<T, EventError> {
    let value = args.first().ok_or(EventError::MissingPayload { event })?;
    T::deserialize(value).map_err(|e| EventError::InvalidPayload {
        event,
        reason: e.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
