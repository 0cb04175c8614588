//! kiosk-scanner library crate.
//!
//! The user side of kiosk pairing: point a camera at the QR code a kiosk is
//! showing, decode it, and navigate to that kiosk's connect page.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! [kiosk-scanner]
//!   ├── domain/           ScannerConfig, interactive Command parsing
//!   ├── application/      ScannerController (state machine + effects),
//!   │                     run_scanner loop, Camera / FrameSource /
//!   │                     QrDecoder / Navigator seams
//!   └── infrastructure/
//!         ├── frames/     DirectoryCamera: image files standing in for a camera
//!         ├── decoder/    RqrrDecoder: QR detection on greyscale frames
//!         └── navigator/  ConsoleNavigator: prints where the user is sent
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `kiosk-core`; devices are reached
//!   only through traits.
//! - `infrastructure` implements those traits with files, `image` and `rqrr`.

/// Domain layer: configuration and command types (no I/O).
pub mod domain;

/// Application layer: the scanner use case and its device seams.
pub mod application;

/// Infrastructure layer: frame files, QR decoding, navigation output.
pub mod infrastructure;
