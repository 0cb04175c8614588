//! Kiosk identifier newtype.
//!
//! A [`KioskId`] names one kiosk and, at the same time, the channel the kiosk
//! joins on the messaging server.  The server treats it as an opaque string,
//! so the only rule enforced here is that it is not blank.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string cannot be used as a kiosk identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("kiosk identifier must not be empty")]
pub struct InvalidKioskId;

/// Opaque, non-empty identifier of a kiosk and its channel.
///
/// # Example
///
/// ```rust
/// use kiosk_core::KioskId;
///
/// let id = KioskId::new("KIOSK-42").unwrap();
/// assert_eq!(id.as_str(), "KIOSK-42");
/// assert!(KioskId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KioskId(String);

impl KioskId {
    /// Wraps `value` after checking that it contains a non-whitespace character.
    ///
    /// The value is stored verbatim; surrounding whitespace is not trimmed
    /// because the server matches channel names byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKioskId`] for empty or whitespace-only input.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidKioskId> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(InvalidKioskId);
        }
        Ok(Self(value))
    }

    /// Borrows the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KioskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for KioskId {
    type Error = InvalidKioskId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KioskId> for String {
    fn from(id: KioskId) -> Self {
        id.0
    }
}

impl AsRef<str> for KioskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_plain_identifier() {
        let id = KioskId::new("lobby-1").unwrap();
        assert_eq!(id.as_str(), "lobby-1");
    }

    #[test]
    fn test_new_rejects_empty_string() {
        assert_eq!(KioskId::new(""), Err(InvalidKioskId));
    }

    #[test]
    fn test_new_rejects_whitespace_only() {
        assert_eq!(KioskId::new(" \t\n"), Err(InvalidKioskId));
    }

    #[test]
    fn test_new_keeps_value_verbatim() {
        // Channel names are matched exactly by the server; no trimming.
        let id = KioskId::new(" A B ").unwrap();
        assert_eq!(id.as_str(), " A B ");
    }

    #[test]
    fn test_display_prints_raw_value() {
        let id = KioskId::new("K/7").unwrap();
        assert_eq!(id.to_string(), "K/7");
    }

    #[test]
    fn test_serde_rejects_blank_identifier() {
        let result: Result<KioskId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_serializes_as_plain_string() {
        let id = KioskId::new("K1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"K1\"");
    }
}
