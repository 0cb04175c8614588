//! Recording renderer for tests.
//!
//! [`RecordingRenderer`] keeps every [`DisplayView`] it is asked to draw in a
//! shared `Mutex<Vec<...>>`.  Clones share the same record, so a test can
//! hand one clone to `run_display` and inspect the frames through another.
//!
//! ```ignore
//! let renderer = RecordingRenderer::new();
//! let frames = renderer.clone();
//! run_display(&config, &mut store, renderer, shutdown).await?;
//! assert_eq!(frames.last().unwrap().status, "Print completed");
//! ```

use std::sync::{Arc, Mutex};

use kiosk_core::DisplayView;

use crate::application::{RenderError, Renderer};

/// A renderer that records views instead of drawing them.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    views: Arc<Mutex<Vec<DisplayView>>>,
    /// When `true`, every render fails with an I/O error.
    pub should_fail: bool,
}

impl RecordingRenderer {
    /// Creates a renderer with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every view rendered so far, oldest first.
    pub fn views(&self) -> Vec<DisplayView> {
        self.views.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// The most recently rendered view.
    pub fn last(&self) -> Option<DisplayView> {
        self.views.lock().ok().and_then(|v| v.last().cloned())
    }

    /// Status lines of every rendered view, oldest first.
    pub fn statuses(&self) -> Vec<String> {
        self.views().into_iter().map(|v| v.status).collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, view: &DisplayView) -> Result<(), RenderError> {
        if self.should_fail {
            return Err(RenderError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "recording renderer set to fail",
            )));
        }
        if let Ok(mut views) = self.views.lock() {
            views.push(view.clone());
        }
        Ok(())
    }
}
