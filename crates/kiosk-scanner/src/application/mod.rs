//! Application layer: the user scanner use case.
//!
//! - [`devices`]: the seams to the outside world ([`Camera`],
//!   [`FrameSource`], [`QrDecoder`], [`Navigator`]).
//! - [`scanner_controller`]: drives [`kiosk_core::ScannerState`] and
//!   executes the effects it requests.
//! - [`run_scanner`]: the interactive loop multiplexing commands and frames.
//! - [`screen`]: the text of the scanner screen.

pub mod devices;
pub mod run_scanner;
pub mod scanner_controller;
pub mod screen;

pub use devices::{Camera, FrameError, FrameSource, Navigator, QrDecoder};
pub use run_scanner::run_scanner;
pub use scanner_controller::ScannerController;
pub use screen::{render_screen, HELP};
