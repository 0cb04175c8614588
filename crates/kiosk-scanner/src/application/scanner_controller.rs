//! Scanner controller: the state machine wired to its devices.
//!
//! [`ScannerState`] decides *what* happens; this controller makes it happen:
//! it starts and releases the camera with the scanning mode, pulls frames
//! through the decoder, and executes each [`ScanEffect`] through the
//! [`Navigator`] or the logout callback.

use tracing::{debug, info, warn};

use kiosk_core::links::absolute_web_url;
use kiosk_core::{DecodeError, ScanEffect, ScannerState};

use crate::application::devices::{Camera, FrameError, FrameSource, Navigator, QrDecoder};
use crate::domain::Command;

/// Owns the scanner state, the active frame stream, and the effect sinks.
pub struct ScannerController<C: Camera, D: QrDecoder, N: Navigator> {
    state: ScannerState,
    camera: Option<C>,
    stream: Option<C::Stream>,
    decoder: D,
    navigator: N,
    on_logout: Box<dyn FnMut()>,
}

impl<C: Camera, D: QrDecoder, N: Navigator> ScannerController<C, D, N> {
    /// Creates an idle controller.
    ///
    /// Without a camera, scanning mode only accepts payloads passed to
    /// [`ScannerController::feed`].
    pub fn new(
        camera: Option<C>,
        decoder: D,
        navigator: N,
        on_logout: impl FnMut() + 'static,
    ) -> Self {
        Self {
            state: ScannerState::new(),
            camera,
            stream: None,
            decoder,
            navigator,
            on_logout: Box::new(on_logout),
        }
    }

    /// Current state.
    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    /// The navigator effects are sent to.
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// `true` if a camera was configured.
    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    /// `true` while a frame stream is held (scanning with a camera).
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Enters scanning mode, starting the camera if there is one.
    ///
    /// # Errors
    ///
    /// Returns the camera's error; the scanner then stays idle.
    pub fn start_scan(&mut self) -> Result<(), FrameError> {
        if self.state.is_scanning() {
            return Ok(());
        }
        if let Some(camera) = &self.camera {
            self.stream = Some(camera.start()?);
            info!("camera started");
        }
        self.state.start_scan();
        Ok(())
    }

    /// Leaves scanning mode and releases the camera.  The last scan result
    /// is kept.
    pub fn cancel(&mut self) {
        self.state.cancel();
        self.release_stream();
    }

    /// Runs the logout callback.  Ignored while scanning.
    pub fn logout(&mut self) -> Option<ScanEffect> {
        match self.state.logout() {
            Some(effect) => {
                self.execute(&effect);
                Some(effect)
            }
            None => {
                debug!("logout is not offered while scanning");
                None
            }
        }
    }

    /// Feeds one decode result, as if it came from the camera.
    ///
    /// Results arriving outside scanning mode are discarded.
    pub fn feed(&mut self, result: Result<String, DecodeError>) -> Option<ScanEffect> {
        let effect = self.state.on_decode(result);
        if !self.state.is_scanning() {
            self.release_stream();
        }
        if let Some(effect) = &effect {
            self.execute(effect);
        }
        effect
    }

    /// Pulls one frame from the active stream and decodes it.
    ///
    /// Does nothing unless scanning with a camera.  Loading and decoding run
    /// on the calling task, so input typed meanwhile is read once this
    /// returns; a late result is still discarded after `cancel`.
    pub fn tick(&mut self) -> Option<ScanEffect> {
        if !self.state.is_scanning() {
            return None;
        }
        let result = {
            let stream = self.stream.as_mut()?;
            stream
                .next_frame()
                .map_err(|e| DecodeError::Frame(e.to_string()))
                .and_then(|frame| self.decoder.decode(&frame))
        };
        self.feed(result)
    }

    /// Applies one interactive command.
    ///
    /// `Help` and `Quit` are handled by the run loop and do nothing here.
    pub fn apply(&mut self, command: Command) -> Option<ScanEffect> {
        match command {
            Command::Scan => {
                if let Err(e) = self.start_scan() {
                    warn!("camera unavailable: {e}");
                }
                None
            }
            Command::Cancel => {
                self.cancel();
                None
            }
            Command::Logout => self.logout(),
            Command::Decode(payload) => self.feed(Ok(payload)),
            Command::Help | Command::Quit => None,
        }
    }

    fn release_stream(&mut self) {
        if self.stream.take().is_some() {
            info!("camera released");
        }
    }

    fn execute(&mut self, effect: &ScanEffect) {
        match effect {
            ScanEffect::Redirect(target) => match absolute_web_url(target) {
                Some(url) => {
                    info!("redirecting to {url}");
                    self.navigator.redirect(&url);
                }
                None => warn!("not an absolute web URL, cannot redirect: {target}"),
            },
            ScanEffect::Route(route) => {
                info!("routing to {route}");
                self.navigator.route(route);
            }
            ScanEffect::Logout => {
                info!("logging out");
                (self.on_logout)();
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
