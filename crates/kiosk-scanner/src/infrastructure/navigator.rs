//! Console navigation: prints where the user would be sent.
//!
//! A browser would load the page; a terminal scanner can only tell the user
//! where to go.  [`ConsoleNavigator`] resolves in-app routes against the
//! frontend origin so both kinds of navigation end in one absolute URL, and
//! remembers it as the current location.

use std::io::Write;

use tracing::warn;
use url::Url;

use kiosk_core::links::resolve_route;

pub use crate::application::devices::Navigator;

/// [`Navigator`] that writes each destination to `out`.
#[derive(Debug)]
pub struct ConsoleNavigator<W: Write> {
    frontend_origin: Url,
    location: Option<Url>,
    out: W,
}

impl ConsoleNavigator<std::io::Stdout> {
    /// Navigator printing to stdout.
    pub fn stdout(frontend_origin: Url) -> Self {
        Self::new(frontend_origin, std::io::stdout())
    }
}

impl<W: Write> ConsoleNavigator<W> {
    pub fn new(frontend_origin: Url, out: W) -> Self {
        Self {
            frontend_origin,
            location: None,
            out,
        }
    }

    /// The last destination, if any navigation happened.
    pub fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }

    /// Consumes the navigator and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn go(&mut self, kind: &str, url: Url) {
        if let Err(e) = writeln!(self.out, "{kind} → {url}") {
            warn!("failed to print navigation: {e}");
        }
        self.location = Some(url);
    }
}

impl<W: Write> Navigator for ConsoleNavigator<W> {
    fn redirect(&mut self, url: &Url) {
        self.go("Opening", url.clone());
    }

    fn route(&mut self, route: &str) {
        match resolve_route(&self.frontend_origin, route) {
            Ok(url) => self.go("Navigating", url),
            Err(e) => warn!("cannot resolve route {route}: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
