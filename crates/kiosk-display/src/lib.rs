//! kiosk-display library crate.
//!
//! The kiosk screen: resolves which kiosk it is, shows a QR code that users
//! scan to pair with it, and then follows the pairing and print events the
//! messaging server pushes to the kiosk's channel.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! messaging server (Socket.IO over WebSocket)
//!         ↕
//! [kiosk-display]
//!   ├── domain/           DisplayConfig (plain runtime settings)
//!   ├── application/      run_display: resolve id → render → event loop
//!   └── infrastructure/
//!         ├── channel/    ChannelSession (tokio-tungstenite + kiosk-core codec)
//!         ├── storage/    FileStore: persistent kioskId in a TOML file
//!         └── terminal/   TerminalRenderer: draws the view and the QR code
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain`, `kiosk-core`, and the `channel`
//!   session; rendering goes through the [`application::Renderer`] trait.
//! - `infrastructure` owns every socket, file, and terminal handle.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: the display run loop.
pub mod application;

/// Infrastructure layer: messaging channel, key-value file, terminal output.
pub mod infrastructure;
