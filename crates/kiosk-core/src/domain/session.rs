//! Startup resolution of the kiosk identifier.
//!
//! The kiosk display is launched with an optional `kioskId` query parameter.
//! When present, that value wins and is remembered in persistent storage so
//! that the next launch without a parameter still knows which kiosk it is.
//! When absent, the remembered value is used.  When neither exists the
//! display has nothing to join and stays in its error state.
//!
//! ```text
//! query kioskId ──present──> store.set(kioskId) ──> Ok(id)
//!       │
//!     absent
//!       ▼
//! store.get(kioskId) ──present──> Ok(id)
//!       │
//!     absent
//!       ▼
//! Err(SessionError::NotFound)
//! ```
//!
//! Both inputs are passed in explicitly; nothing here reads the process
//! environment or a global.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::domain::kiosk_id::KioskId;

/// Storage key (and query parameter name) holding the kiosk identifier.
pub const KIOSK_ID_KEY: &str = "kioskId";

/// Errors produced by [`resolve_kiosk_id`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Neither the query string nor storage supplied a usable identifier.
    #[error("No kioskId found")]
    NotFound,
}

/// Simple string key-value storage that survives restarts.
///
/// The kiosk display only ever stores one entry ([`KIOSK_ID_KEY`]), but the
/// trait is kept generic so file-backed and in-memory stores are
/// interchangeable.
pub trait KeyValueStore {
    /// Error type reported by the backing store.
    type Error: fmt::Display;

    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// In-memory [`KeyValueStore`], used in tests and when persistence is off.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Decoded launch query parameters.
///
/// Keeps pairs in their original order; [`QueryParams::get`] returns the first
/// occurrence of a key, matching how browsers resolve `URLSearchParams.get`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses a form-urlencoded query string, with or without a leading `?`.
    ///
    /// ```rust
    /// use kiosk_core::QueryParams;
    ///
    /// let q = QueryParams::parse("?kioskId=A%20B&x=1");
    /// assert_eq!(q.get("kioskId"), Some("A B"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Appends a pair (later pairs never shadow earlier ones).
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Returns the first value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over all pairs in their original order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` when no pairs were parsed.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Resolves the kiosk identifier for this display session.
///
/// A non-empty `kioskId` query parameter takes precedence and is written to
/// `store`.  Otherwise the stored value is used.  Storage failures are logged
/// and never prevent a query-supplied identifier from being used.
///
/// # Errors
///
/// Returns [`SessionError::NotFound`] when no usable identifier exists.
///
/// # Example
///
/// ```rust
/// use kiosk_core::{resolve_kiosk_id, KeyValueStore, MemoryStore, QueryParams};
///
/// let mut store = MemoryStore::new();
/// let id = resolve_kiosk_id(&QueryParams::parse("kioskId=K1"), &mut store).unwrap();
/// assert_eq!(id.as_str(), "K1");
/// assert_eq!(store.get("kioskId").unwrap().as_deref(), Some("K1"));
/// ```
pub fn resolve_kiosk_id<S: KeyValueStore>(
    query: &QueryParams,
    store: &mut S,
) -> Result<KioskId, SessionError> {
    if let Some(id) = query.get(KIOSK_ID_KEY).and_then(|v| KioskId::new(v).ok()) {
        debug!("kiosk id {id} supplied by query parameter");
        if let Err(e) = store.set(KIOSK_ID_KEY, id.as_str()) {
            warn!("could not persist kiosk id {id}: {e}");
        }
        return Ok(id);
    }

    let stored = match store.get(KIOSK_ID_KEY) {
        Ok(value) => value,
        Err(e) => {
            warn!("could not read stored kiosk id: {e}");
            None
        }
    };

    match stored.and_then(|v| KioskId::new(v).ok()) {
        Some(id) => {
            debug!("kiosk id {id} restored from storage");
            Ok(id)
        }
        None => Err(SessionError::NotFound),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
