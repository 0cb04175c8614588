//! Messaging channel: one Socket.IO session joined to the kiosk's room.
//!
//! This module is responsible for:
//!
//! 1. Deriving the WebSocket endpoint from the messaging server origin.
//! 2. Completing the Engine.IO / Socket.IO handshake and emitting
//!    `join_kiosk` with the kiosk id.
//! 3. Running a single reader task that answers heartbeats, decodes server
//!    events into [`DisplayEvent`]s and forwards them, in arrival order, to
//!    the owner of the [`ChannelSession`].
//! 4. Tearing the connection down when the session is closed or dropped.
//!
//! # Handshake
//!
//! ```text
//! kiosk                                   server
//!   │ ── WebSocket upgrade ─────────────────▶ │
//!   │ ◀──────────────── 0{"sid":..,"pingInterval":..} │  Engine.IO open
//!   │ ── 40 ────────────────────────────────▶ │  Socket.IO connect "/"
//!   │ ◀──────────────────────── 40{"sid":..} │  connect ack (or 44 error)
//!   │ ── 42["join_kiosk","<id>"] ───────────▶ │
//!   │ ◀────────────── 2 / 42[...] / ...       │  reader task from here on
//! ```
//!
//! The whole handshake is bounded by `DisplayConfig::connect_timeout`.
//!
//! # Lifetime
//!
//! The reader task owns the socket.  [`ChannelSession::close`] disconnects
//! gracefully; dropping the session on any other path aborts the task, which
//! drops the socket.  Either way no event is delivered after the session is
//! gone.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};
use url::Url;

use kiosk_core::protocol::packet::OpenHandshake;
use kiosk_core::{
    decode_display_event, decode_packet, encode_packet, join_packet, DisplayEvent, EnginePacket,
    KioskId, PacketError, SocketPacket,
};

use crate::domain::DisplayConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Socket.IO server path.
const SOCKET_IO_PATH: &str = "/socket.io/";

/// Capacity of the reader → owner event queue.
const EVENT_QUEUE_CAPACITY: usize = 64;

/// How long [`ChannelSession::close`] waits for the disconnect to flush.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors raised while opening the channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The messaging origin does not use `http`, `https`, `ws` or `wss`.
    #[error("unsupported messaging server scheme: {0}")]
    UnsupportedScheme(String),

    /// The WebSocket connection or a frame write failed.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// The server sent a frame that is not a valid Socket.IO text packet.
    #[error("invalid packet from server: {0}")]
    Packet(#[from] PacketError),

    /// The server refused the namespace connection.
    #[error("server rejected the connection: {0}")]
    Rejected(String),

    /// The server closed the connection before the handshake finished.
    #[error("connection closed during handshake")]
    ClosedDuringHandshake,

    /// The handshake did not finish within the configured bound.
    #[error("handshake did not complete within {0:?}")]
    Timeout(Duration),
}

// ── Public types ──────────────────────────────────────────────────────────────

/// What the reader task hands to the session owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A decoded server event for the display reducer.
    Display(DisplayEvent),
    /// The connection is gone; no further events will follow.
    Closed { reason: String },
}

/// Derives the Engine.IO WebSocket endpoint from the messaging server origin.
///
/// `http` maps to `ws` and `https` to `wss`; the path is always
/// `/socket.io/` and the query selects Engine.IO v4 over WebSocket.
///
/// # Errors
///
/// Returns [`ChannelError::UnsupportedScheme`] for any other scheme.
///
/// # Example
///
/// ```rust
/// use kiosk_display::infrastructure::channel::websocket_endpoint;
/// use url::Url;
///
/// let url = websocket_endpoint(&Url::parse("https://chat.example.com").unwrap()).unwrap();
/// assert_eq!(url.as_str(), "wss://chat.example.com/socket.io/?EIO=4&transport=websocket");
/// ```
pub fn websocket_endpoint(origin: &Url) -> Result<Url, ChannelError> {
    let scheme = match origin.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ChannelError::UnsupportedScheme(other.to_string())),
    };

    let mut url = origin.clone();
    url.set_scheme(scheme)
        .map_err(|()| ChannelError::UnsupportedScheme(origin.scheme().to_string()))?;
    url.set_path(SOCKET_IO_PATH);
    url.set_query(Some("EIO=4&transport=websocket"));
    url.set_fragment(None);
    Ok(url)
}

/// A live, joined messaging channel.
///
/// Owns the reader task; see the module docs for the lifetime rules.
#[derive(Debug)]
pub struct ChannelSession {
    sid: String,
    events: mpsc::Receiver<ChannelEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ChannelSession {
    /// Connects to the messaging server, joins the kiosk's channel and starts
    /// the reader task.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] if the endpoint is invalid, the connection or
    /// handshake fails, the server rejects the namespace, or the handshake
    /// exceeds `config.connect_timeout`.
    pub async fn open(config: &DisplayConfig, kiosk_id: &KioskId) -> Result<Self, ChannelError> {
        let endpoint = websocket_endpoint(&config.socket_origin)?;
        info!("connecting to messaging server at {endpoint}");

        let (ws, open) = timeout(config.connect_timeout, connect_and_join(&endpoint, kiosk_id))
            .await
            .map_err(|_| ChannelError::Timeout(config.connect_timeout))??;

        info!(
            "joined channel for kiosk {kiosk_id} (sid={}, liveness window {:?})",
            open.sid,
            open.liveness_window()
        );

        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(read_loop(ws, event_tx, shutdown_rx, open.liveness_window()));

        Ok(Self {
            sid: open.sid,
            events: event_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Engine.IO session id assigned by the server.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Waits for the next event from the reader task.
    ///
    /// Once the reader has stopped this keeps returning
    /// [`ChannelEvent::Closed`].
    pub async fn next_event(&mut self) -> ChannelEvent {
        self.events.recv().await.unwrap_or_else(|| ChannelEvent::Closed {
            reason: "reader task stopped".to_string(),
        })
    }

    /// Disconnects gracefully: Socket.IO disconnect, then a WebSocket close
    /// frame.  Falls back to aborting the reader if that takes too long.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(mut task) = self.task.take() {
            if timeout(CLOSE_GRACE, &mut task).await.is_err() {
                warn!("channel did not close within {CLOSE_GRACE:?}; aborting");
                task.abort();
            }
        }
        info!("channel closed");
    }
}

impl Drop for ChannelSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("channel session dropped; aborting reader task");
            task.abort();
        }
    }
}

// ── Handshake ─────────────────────────────────────────────────────────────────

async fn connect_and_join(
    endpoint: &Url,
    kiosk_id: &KioskId,
) -> Result<(WsStream, OpenHandshake), ChannelError> {
    let (mut ws, _response) = connect_async(endpoint.as_str()).await?;

    // Engine.IO open.
    let open = loop {
        match next_packet(&mut ws).await? {
            EnginePacket::Open(open) => break open,
            other => debug!("ignoring {other:?} before open"),
        }
    };
    debug!("engine session open: sid={}", open.sid);

    // Socket.IO connect to the default namespace.
    send_packet(&mut ws, &EnginePacket::Message(SocketPacket::connect())).await?;
    loop {
        match next_packet(&mut ws).await? {
            EnginePacket::Message(SocketPacket::Connect { .. }) => break,
            EnginePacket::Message(SocketPacket::ConnectError { data, .. }) => {
                let reason = data.map(|d| d.to_string()).unwrap_or_default();
                return Err(ChannelError::Rejected(reason));
            }
            EnginePacket::Ping(data) => send_packet(&mut ws, &EnginePacket::Pong(data)).await?,
            EnginePacket::Close => return Err(ChannelError::ClosedDuringHandshake),
            other => debug!("ignoring {other:?} before connect ack"),
        }
    }

    send_packet(&mut ws, &join_packet(kiosk_id)).await?;
    Ok((ws, open))
}

/// Reads frames until one decodes into an Engine.IO packet.
async fn next_packet(ws: &mut WsStream) -> Result<EnginePacket, ChannelError> {
    loop {
        match ws.next().await {
            Some(Ok(WsMessage::Text(text))) => return Ok(decode_packet(&text)?),
            Some(Ok(WsMessage::Close(_))) | None => return Err(ChannelError::ClosedDuringHandshake),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    }
}

async fn send_packet(ws: &mut WsStream, packet: &EnginePacket) -> Result<(), ChannelError> {
    let frame = encode_packet(packet)?;
    ws.send(WsMessage::Text(frame)).await?;
    Ok(())
}

// ── Reader task ───────────────────────────────────────────────────────────────

enum Step {
    Shutdown,
    Frame(Result<Option<Result<WsMessage, WsError>>, tokio::time::error::Elapsed>),
}

/// What to do after one frame.
enum Flow {
    Continue,
    Stop(String),
}

async fn read_loop(
    mut ws: WsStream,
    events: mpsc::Sender<ChannelEvent>,
    mut shutdown: oneshot::Receiver<()>,
    liveness: Duration,
) {
    let reason = loop {
        // Resolve the select first so the socket is free to write afterwards.
        let step = tokio::select! {
            _ = &mut shutdown => Step::Shutdown,
            frame = timeout(liveness, ws.next()) => Step::Frame(frame),
        };

        match step {
            Step::Shutdown => {
                disconnect(&mut ws).await;
                return;
            }
            Step::Frame(Err(_)) => break format!("no frame from server within {liveness:?}"),
            Step::Frame(Ok(None)) => break "connection closed by server".to_string(),
            Step::Frame(Ok(Some(Err(e)))) => break format!("WebSocket error: {e}"),
            Step::Frame(Ok(Some(Ok(WsMessage::Close(frame))))) => {
                break match frame {
                    Some(frame) => format!("server closed the connection: {}", frame.reason),
                    None => "server closed the connection".to_string(),
                };
            }
            Step::Frame(Ok(Some(Ok(WsMessage::Text(text))))) => {
                match handle_frame(&mut ws, &events, &text).await {
                    Flow::Continue => {}
                    Flow::Stop(reason) => break reason,
                }
            }
            Step::Frame(Ok(Some(Ok(other)))) => {
                debug!("ignoring non-text WebSocket frame ({} bytes)", other.len());
            }
        }
    };

    warn!("channel closed: {reason}");
    let _ = events.send(ChannelEvent::Closed { reason }).await;
}

async fn handle_frame(ws: &mut WsStream, events: &mpsc::Sender<ChannelEvent>, text: &str) -> Flow {
    let packet = match decode_packet(text) {
        Ok(packet) => packet,
        Err(e) => {
            warn!("skipping undecodable frame: {e}");
            return Flow::Continue;
        }
    };

    match packet {
        EnginePacket::Ping(data) => {
            debug!("heartbeat ping");
            if let Err(e) = send_packet(ws, &EnginePacket::Pong(data)).await {
                return Flow::Stop(format!("failed to answer heartbeat: {e}"));
            }
        }
        EnginePacket::Message(SocketPacket::Event { name, args, .. }) => {
            match decode_display_event(&name, &args) {
                Ok(Some(event)) => {
                    debug!("server event {name} → {}", event.kind());
                    if events.send(ChannelEvent::Display(event)).await.is_err() {
                        return Flow::Stop("session owner went away".to_string());
                    }
                }
                Ok(None) => debug!("ignoring unknown event {name}"),
                Err(e) => warn!("skipping event: {e}"),
            }
        }
        EnginePacket::Message(SocketPacket::Disconnect { .. }) => {
            return Flow::Stop("server disconnected the namespace".to_string());
        }
        EnginePacket::Close => return Flow::Stop("server closed the engine session".to_string()),
        other => debug!("ignoring {other:?}"),
    }
    Flow::Continue
}

/// Best-effort graceful disconnect.
async fn disconnect(ws: &mut WsStream) {
    if let Err(e) = send_packet(ws, &EnginePacket::Message(SocketPacket::disconnect())).await {
        debug!("could not send namespace disconnect: {e}");
    }
    if let Err(e) = ws.close(None).await {
        debug!("WebSocket close failed: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
