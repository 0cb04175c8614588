//! Commands accepted on the scanner's interactive input.
//!
//! | Input              | Command            | Screen   |
//! |--------------------|--------------------|----------|
//! | `scan`             | [`Command::Scan`]   | idle     |
//! | `cancel`           | [`Command::Cancel`] | scanning |
//! | `logout`           | [`Command::Logout`] | idle     |
//! | `decode <payload>` | [`Command::Decode`] | scanning |
//! | `help`             | [`Command::Help`]   | any      |
//! | `quit` / `exit`    | [`Command::Quit`]   | any      |
//!
//! `decode` feeds a payload as if the camera had read it, which is how a
//! scanner without a frame source is driven.

use thiserror::Error;

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan,
    Cancel,
    Logout,
    /// Simulated camera read; the payload is everything after the keyword.
    Decode(String),
    Help,
    Quit,
}

/// Input that is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty input")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'decode' needs a payload, e.g. 'decode KIOSK-42'")]
    MissingPayload,
}

/// Parses one input line.  Keywords are case-insensitive; the `decode`
/// payload is kept verbatim apart from surrounding whitespace.
///
/// ```rust
/// use kiosk_scanner::domain::{parse_command, Command};
///
/// assert_eq!(parse_command("  SCAN "), Ok(Command::Scan));
/// assert_eq!(
///     parse_command("decode https://print.example.com/connect?kioskId=K1"),
///     Ok(Command::Decode("https://print.example.com/connect?kioskId=K1".into()))
/// );
/// ```
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword.to_ascii_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "scan" => Ok(Command::Scan),
        "cancel" => Ok(Command::Cancel),
        "logout" => Ok(Command::Logout),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "decode" if rest.is_empty() => Err(CommandError::MissingPayload),
        "decode" => Ok(Command::Decode(rest.to_string())),
        _ => Err(CommandError::Unknown(keyword.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
