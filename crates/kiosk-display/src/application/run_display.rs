//! Kiosk display run loop.
//!
//! ```text
//! resolve_kiosk_id(query, store)
//!   ├── Err  → render "No kioskId found", wait for shutdown (never connects)
//!   └── Ok   → render idle screen + QR
//!              ChannelSession::open → join_kiosk
//!              loop select! {
//!                  shutdown           → close channel, return
//!                  Display(event)     → state.apply(event), render
//!                  Closed { reason }  → return Err (no reconnect)
//!              }
//! ```

use std::future::Future;

use anyhow::Context;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use kiosk_core::{resolve_kiosk_id, DisplayEvent, DisplayState, DisplayView, KeyValueStore};

use crate::domain::DisplayConfig;
use crate::infrastructure::channel::{ChannelEvent, ChannelSession};

// ── Rendering seam ────────────────────────────────────────────────────────────

/// Errors a [`Renderer`] can report.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The join payload could not be encoded as a QR code.
    #[error("failed to encode join QR code: {0}")]
    Qr(String),

    /// Writing the screen failed.
    #[error("failed to write screen: {0}")]
    Io(#[from] std::io::Error),
}

/// Draws a [`DisplayView`].
///
/// Implementations must be cheap to call repeatedly: the whole screen is
/// redrawn after every state change.
pub trait Renderer {
    /// Draws `view`, replacing whatever was shown before.
    fn render(&mut self, view: &DisplayView) -> Result<(), RenderError>;
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Owns the display state and redraws it after every change.
///
/// This is the single writer of [`DisplayState`]; events reach it only from
/// the run loop.
pub struct DisplayController<R: Renderer> {
    state: DisplayState,
    frontend_origin: Url,
    renderer: R,
}

impl<R: Renderer> DisplayController<R> {
    /// Creates a controller showing `state`.  Nothing is drawn until
    /// [`DisplayController::render`] or [`DisplayController::handle`] is
    /// called.
    pub fn new(state: DisplayState, frontend_origin: Url, renderer: R) -> Self {
        Self {
            state,
            frontend_origin,
            renderer,
        }
    }

    /// Current state.
    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Draws the current state.
    ///
    /// # Errors
    ///
    /// Propagates the renderer's error.
    pub fn render(&mut self) -> Result<(), RenderError> {
        let view = self.state.view(&self.frontend_origin);
        self.renderer.render(&view)
    }

    /// Applies `event` and redraws.
    ///
    /// # Errors
    ///
    /// Propagates the renderer's error; the state is updated either way.
    pub fn handle(&mut self, event: DisplayEvent) -> Result<(), RenderError> {
        info!("display event: {}", event.kind());
        self.state.apply(event);
        self.render()
    }

    /// Consumes the controller and returns the final state.
    pub fn into_state(self) -> DisplayState {
        self.state
    }
}

// ── Run loop ──────────────────────────────────────────────────────────────────

/// Runs the kiosk display until `shutdown` resolves or the channel drops.
///
/// Returns the final display state on a requested shutdown.
///
/// # Errors
///
/// Returns an error if the screen cannot be drawn, the channel cannot be
/// opened, or the channel closes while running.  There is no reconnect: a
/// supervisor is expected to restart the process.
pub async fn run_display<S, R, F>(
    config: &DisplayConfig,
    store: &mut S,
    renderer: R,
    shutdown: F,
) -> anyhow::Result<DisplayState>
where
    S: KeyValueStore,
    R: Renderer,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let kiosk_id = match resolve_kiosk_id(&config.query, store) {
        Ok(id) => id,
        Err(e) => {
            // Terminal state: show the error and never join a channel.
            error!("{e}; start the kiosk with ?kioskId=<id> once to register it");
            let mut controller = DisplayController::new(
                DisplayState::missing_id(),
                config.frontend_origin.clone(),
                renderer,
            );
            controller.render().context("failed to draw error screen")?;
            shutdown.await;
            return Ok(controller.into_state());
        }
    };
    info!("kiosk id: {kiosk_id}");

    let mut controller = DisplayController::new(
        DisplayState::idle(kiosk_id.clone()),
        config.frontend_origin.clone(),
        renderer,
    );
    controller.render().context("failed to draw idle screen")?;

    let mut session = ChannelSession::open(config, &kiosk_id)
        .await
        .with_context(|| format!("failed to join channel for kiosk {kiosk_id}"))?;

    loop {
        let next = tokio::select! {
            () = &mut shutdown => None,
            event = session.next_event() => Some(event),
        };

        match next {
            None => {
                info!("shutdown requested; leaving channel");
                session.close().await;
                return Ok(controller.into_state());
            }
            Some(ChannelEvent::Display(event)) => {
                controller.handle(event).context("failed to redraw screen")?;
            }
            Some(ChannelEvent::Closed { reason }) => {
                anyhow::bail!("messaging channel closed: {reason}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::RecordingRenderer;
    use kiosk_core::{FileInfo, KioskId, MemoryStore, QueryParams, KIOSK_ID_KEY};
    use std::time::Duration;

    fn origin() -> Url {
        Url::parse("https://print.example.com").unwrap()
    }

    #[test]
    fn test_controller_render_draws_current_state() {
        let renderer = RecordingRenderer::new();
        let mut controller = DisplayController::new(
            DisplayState::idle(KioskId::new("K1").unwrap()),
            origin(),
            renderer.clone(),
        );

        controller.render().unwrap();

        let view = renderer.last().unwrap();
        assert_eq!(view.status, "Waiting for user to scan QR...");
        assert_eq!(
            view.join_code.unwrap().payload,
            "https://print.example.com/connect?kioskId=K1"
        );
    }

    #[test]
    fn test_controller_handle_applies_then_redraws() {
        let renderer = RecordingRenderer::new();
        let mut controller = DisplayController::new(
            DisplayState::idle(KioskId::new("K1").unwrap()),
            origin(),
            renderer.clone(),
        );

        controller
            .handle(DisplayEvent::FileReceived(FileInfo {
                filename: "a.pdf".into(),
                size: None,
            }))
            .unwrap();

        assert_eq!(renderer.statuses(), vec!["File received: a.pdf".to_string()]);
        assert_eq!(controller.state().file_info.as_ref().unwrap().filename, "a.pdf");
    }

    #[test]
    fn test_controller_render_error_keeps_state_change() {
        let mut renderer = RecordingRenderer::new();
        renderer.should_fail = true;
        let mut controller = DisplayController::new(
            DisplayState::idle(KioskId::new("K1").unwrap()),
            origin(),
            renderer,
        );

        let result = controller.handle(DisplayEvent::Connected {
            message: "hi".into(),
        });

        assert!(matches!(result, Err(RenderError::Io(_))));
        assert!(controller.state().connected);
    }

    #[tokio::test]
    async fn test_missing_id_renders_error_and_never_connects() {
        // Arrange: a listener that would record any connection attempt.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let cfg = DisplayConfig::new(
            origin(),
            Url::parse(&format!("http://127.0.0.1:{port}")).unwrap(),
        );
        let mut store = MemoryStore::new();
        let renderer = RecordingRenderer::new();

        // Act: shutdown is already resolved.
        let state = run_display(&cfg, &mut store, renderer.clone(), async {})
            .await
            .unwrap();

        // Assert
        assert!(state.is_terminal_error());
        assert_eq!(renderer.statuses(), vec!["No kioskId found".to_string()]);
        let accepted = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
        assert!(accepted.is_err(), "display must not connect without a kiosk id");
    }

    #[test]
    fn test_missing_id_waits_for_shutdown() {
        use tokio_test::{assert_pending, assert_ready, task};

        let cfg = DisplayConfig::new(origin(), origin());
        let mut store = MemoryStore::new();
        let renderer = RecordingRenderer::new();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let mut run = task::spawn(run_display(&cfg, &mut store, renderer.clone(), async {
            let _ = stop_rx.await;
        }));

        assert_pending!(run.poll());
        assert_eq!(renderer.statuses(), vec!["No kioskId found".to_string()]);

        stop_tx.send(()).unwrap();
        assert!(run.is_woken());
        let state = assert_ready!(run.poll()).unwrap();
        assert!(state.is_terminal_error());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error_after_idle_render() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut cfg = DisplayConfig::new(
            origin(),
            Url::parse(&format!("http://127.0.0.1:{port}")).unwrap(),
        );
        cfg.query = QueryParams::parse("kioskId=K9");
        cfg.connect_timeout = Duration::from_secs(2);
        let mut store = MemoryStore::new();
        let renderer = RecordingRenderer::new();

        let result = run_display(&cfg, &mut store, renderer.clone(), std::future::pending()).await;

        assert!(result.is_err());
        // The id was still persisted and the idle screen drawn first.
        assert_eq!(store.get(KIOSK_ID_KEY).unwrap().as_deref(), Some("K9"));
        assert_eq!(
            renderer.statuses(),
            vec!["Waiting for user to scan QR...".to_string()]
        );
    }
}
