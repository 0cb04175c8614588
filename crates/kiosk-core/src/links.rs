//! Link building shared by the kiosk display and the user scanner.
//!
//! The kiosk's QR code encodes a URL of the user-facing web app:
//!
//! ```text
//! https://print.example.com/connect?kioskId=KIOSK-42
//! ```
//!
//! The scanner accepts either that full URL (and simply follows it) or a bare
//! identifier such as `KIOSK-42`, in which case it routes to the same connect
//! page itself.  Both paths put the identifier in the `kioskId` query
//! parameter, form-urlencoded.

use url::{form_urlencoded, Url};

use crate::domain::kiosk_id::KioskId;
use crate::domain::session::KIOSK_ID_KEY;

/// Path segment of the connect page in the user-facing app.
pub const CONNECT_SEGMENT: &str = "connect";

/// Builds the join URL shown in the kiosk's QR code.
///
/// Any path already present on `frontend_origin` is kept, so an app mounted
/// under `/app` produces `/app/connect`.  An existing query or fragment on the
/// origin is dropped.
///
/// ```rust
/// use kiosk_core::{links::join_url, KioskId};
/// use url::Url;
///
/// let origin = Url::parse("https://print.example.com").unwrap();
/// let id = KioskId::new("KIOSK 42").unwrap();
/// assert_eq!(
///     join_url(&origin, &id).as_str(),
///     "https://print.example.com/connect?kioskId=KIOSK+42"
/// );
/// ```
pub fn join_url(frontend_origin: &Url, kiosk_id: &KioskId) -> Url {
    let mut url = frontend_origin.clone();
    url.set_fragment(None);
    url.set_query(None);
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(CONNECT_SEGMENT);
    }
    url.query_pairs_mut()
        .append_pair(KIOSK_ID_KEY, kiosk_id.as_str());
    url
}

/// Builds the in-app route to the connect page for a bare identifier.
///
/// Reserved characters are percent-encoded (spaces become `+`).
///
/// ```rust
/// use kiosk_core::links::connect_route;
///
/// assert_eq!(connect_route("KIOSK-42"), "/connect?kioskId=KIOSK-42");
/// assert_eq!(connect_route("a/b&c"), "/connect?kioskId=a%2Fb%26c");
/// ```
pub fn connect_route(kiosk_id: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(KIOSK_ID_KEY, kiosk_id)
        .finish();
    format!("/{CONNECT_SEGMENT}?{query}")
}

/// Returns the parsed URL when `text` is an absolute `http`/`https` URL.
///
/// Anything else (a bare identifier, a relative path, another scheme) yields
/// `None` and is treated as a kiosk identifier by the scanner.
pub fn absolute_web_url(text: &str) -> Option<Url> {
    let url = Url::parse(text).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

/// Resolves an in-app route (as built by [`connect_route`]) against the
/// frontend origin, keeping any base path the app is mounted under.
///
/// # Errors
///
/// Returns the URL parse error if the route cannot be joined.
pub fn resolve_route(frontend_origin: &Url, route: &str) -> Result<Url, url::ParseError> {
    let mut base = frontend_origin.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(route.trim_start_matches('/'))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
