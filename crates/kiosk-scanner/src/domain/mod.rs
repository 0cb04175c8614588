//! Domain layer for the user scanner.

pub mod command;
pub mod config;

pub use command::{parse_command, Command, CommandError};
pub use config::ScannerConfig;
