//! Application layer: the kiosk display use case.
//!
//! [`run_display`] resolves the kiosk id, draws the screen, joins the
//! messaging channel and folds every server event through the display
//! reducer until shutdown.  Drawing goes through the [`Renderer`] trait so
//! the loop can be driven in tests without a terminal.

pub mod run_display;

pub use run_display::{run_display, DisplayController, RenderError, Renderer};
