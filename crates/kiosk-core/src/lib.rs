//! # kiosk-core
//!
//! Shared library for the kiosk print pairing screens.  It holds everything
//! that both the kiosk display and the user scanner need but that does not
//! touch a socket, a terminal, or a camera.
//!
//! # Architecture overview (for beginners)
//!
//! A kiosk is a printing terminal with a screen.  The screen shows a QR code.
//! A user scans that code with their phone, which pairs the phone with the
//! kiosk through an external real-time server.  From then on the server pushes
//! events ("file received", "print this") to the kiosk's channel and the
//! kiosk screen updates.
//!
//! This crate defines:
//!
//! - **`domain`** – The kiosk identifier, how it is resolved at startup
//!   ([`resolve_kiosk_id`]), the display reducer ([`DisplayState::apply`]),
//!   and the scanner state machine ([`ScannerState`]).
//!
//! - **`protocol`** – The Socket.IO v4 text packet codec used on the
//!   messaging channel, and the mapping from named server events to
//!   [`DisplayEvent`]s.
//!
//! - **`links`** – Building the join URL embedded in the QR code and the
//!   connect route the scanner navigates to.
//!
//! - **`api`** – A preconfigured HTTP client handle for the backend origin.
//!   It is configuration only; no endpoint is called from here.

pub mod api;
pub mod domain;
pub mod links;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `kiosk_core::KioskId` instead of `kiosk_core::domain::kiosk_id::KioskId`.
pub use domain::display::{DisplayEvent, DisplayState, DisplayView, FileInfo, PrintSettings};
pub use domain::kiosk_id::{InvalidKioskId, KioskId};
pub use domain::scanner::{DecodeError, ScanEffect, ScanMode, ScannerState};
pub use domain::session::{
    resolve_kiosk_id, KeyValueStore, MemoryStore, QueryParams, SessionError, KIOSK_ID_KEY,
};
pub use protocol::events::{decode_display_event, join_packet, EventError};
pub use protocol::packet::{decode_packet, encode_packet, EnginePacket, PacketError, SocketPacket};
