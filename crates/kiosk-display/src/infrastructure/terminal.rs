//! Terminal front end for the kiosk screen.
//!
//! Draws a [`DisplayView`] as plain text with the join code rendered as a
//! Unicode QR code (two modules per character cell, so it stays square in
//! most terminal fonts).  Logs go to stderr; the screen goes to whatever
//! writer the renderer wraps, normally stdout.

use std::io::Write;

use qrcode::render::unicode;
use qrcode::QrCode;

use kiosk_core::DisplayView;

use crate::application::{RenderError, Renderer};

/// ANSI "clear screen, cursor home".
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Builds the full text of one screen.
///
/// # Errors
///
/// Returns [`RenderError::Qr`] if the join payload cannot be encoded as a QR
/// code (for example, it exceeds the largest QR version).
pub fn render_view(view: &DisplayView) -> Result<String, RenderError> {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n\n", view.title));
    out.push_str(&view.status);
    out.push('\n');

    if let Some(join) = &view.join_code {
        let code = QrCode::new(join.payload.as_bytes()).map_err(|e| RenderError::Qr(e.to_string()))?;
        // Inverted colors: light modules on a dark terminal read as dark.
        let image = code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build();
        out.push('\n');
        out.push_str(&image);
        out.push('\n');
        out.push_str(&join.footer);
        out.push('\n');
    }

    if let Some(file) = &view.file {
        out.push_str("\nFile Received\n");
        out.push_str(&format!("  Name: {}\n", file.filename));
        out.push_str(&format!("  Size: {}\n", file.size_label));
    }

    if let Some(print) = &view.print {
        out.push_str("\nPrint Settings\n");
        out.push_str(&format!("  Color: {}\n", print.color));
        out.push_str(&format!("  Copies: {}\n", print.copies));
    }

    Ok(out)
}

/// [`Renderer`] that redraws the whole screen on every update.
#[derive(Debug)]
pub struct TerminalRenderer<W: Write> {
    out: W,
    clear: bool,
}

impl TerminalRenderer<std::io::Stdout> {
    /// Renderer on stdout that clears the screen before each frame.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), true)
    }
}

impl<W: Write> TerminalRenderer<W> {
    /// Wraps `out`.  With `clear` set, every frame starts with an ANSI clear.
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    /// Consumes the renderer and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, view: &DisplayView) -> Result<(), RenderError> {
        let screen = render_view(view)?;
        if self.clear {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        self.out.write_all(screen.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
