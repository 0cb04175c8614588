//! Domain layer for the kiosk display.

pub mod config;

pub use config::DisplayConfig;
