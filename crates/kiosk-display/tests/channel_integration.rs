//! Integration tests for the messaging channel and the display run loop.
//!
//! A loopback Socket.IO server built on `tokio-tungstenite::accept_async`
//! plays the messaging server side of the handshake:
//!
//! ```text
//! server → 0{"sid":"test-sid",...}
//! client → 40
//! server → 40{"sid":"sock-1"}
//! client → 42["join_kiosk","<id>"]
//! ```
//!
//! and then pushes whatever frames a test needs.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use url::Url;

use kiosk_core::{DisplayEvent, KeyValueStore, KioskId, PrintSettings, QueryParams, KIOSK_ID_KEY};
use kiosk_display::application::run_display;
use kiosk_display::domain::DisplayConfig;
use kiosk_display::infrastructure::{
    ChannelError, ChannelEvent, ChannelSession, FileStore, RecordingRenderer,
};

const OPEN_FRAME: &str = r#"0{"sid":"test-sid","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
/// Open packet announcing a 200 ms liveness window.
const SHORT_WINDOW_OPEN_FRAME: &str = r#"0{"sid":"short-sid","upgrades":[],"pingInterval":100,"pingTimeout":100,"maxPayload":1000000}"#;
const STEP: Duration = Duration::from_secs(5);

type ServerWs = WebSocketStream<TcpStream>;

// ── Loopback server ───────────────────────────────────────────────────────────

struct FakeServer {
    listener: TcpListener,
    origin: Url,
}

impl FakeServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let origin = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
        Self { listener, origin }
    }

    fn config(&self) -> DisplayConfig {
        let mut cfg = DisplayConfig::new(
            Url::parse("https://print.example.com").unwrap(),
            self.origin.clone(),
        );
        cfg.connect_timeout = Duration::from_secs(2);
        cfg
    }

    /// Accepts one WebSocket connection without any Socket.IO exchange.
    async fn accept_raw(&self) -> ServerWs {
        let (stream, _) = self.listener.accept().await.unwrap();
        accept_async(stream).await.unwrap()
    }

    /// Accepts one client, completes the handshake, and returns the socket
    /// together with the join frame the client sent.
    async fn accept_joined(&self) -> (ServerWs, String) {
        self.accept_joined_with(OPEN_FRAME).await
    }

    /// Like [`FakeServer::accept_joined`], announcing `open_frame`.
    async fn accept_joined_with(&self, open_frame: &str) -> (ServerWs, String) {
        let mut ws = self.accept_raw().await;
        send(&mut ws, open_frame).await;
        assert_eq!(recv_text(&mut ws).await, "40");
        send(&mut ws, r#"40{"sid":"sock-1"}"#).await;
        let join = recv_text(&mut ws).await;
        (ws, join)
    }
}

async fn send(ws: &mut ServerWs, frame: &str) {
    ws.send(Message::Text(frame.to_string())).await.unwrap();
}

async fn recv_text(ws: &mut ServerWs) -> String {
    loop {
        match timeout(STEP, ws.next()).await.expect("client frame in time") {
            Some(Ok(Message::Text(text))) => return text,
            Some(Ok(_)) => continue,
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

fn kiosk(id: &str) -> KioskId {
    KioskId::new(id).unwrap()
}

// ── Handshake ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_open_connects_namespace_and_joins_kiosk_channel() {
    // Arrange
    let server = FakeServer::start().await;
    let cfg = server.config();
    let client = tokio::spawn(async move { ChannelSession::open(&cfg, &kiosk("LOBBY-1")).await });

    // Act
    let (_ws, join) = server.accept_joined().await;
    let session = client.await.unwrap().unwrap();

    // Assert
    assert_eq!(join, r#"42["join_kiosk","LOBBY-1"]"#);
    assert_eq!(session.sid(), "test-sid");
}

#[tokio::test]
async fn test_connect_error_rejects_open() {
    let server = FakeServer::start().await;
    let cfg = server.config();
    let client = tokio::spawn(async move { ChannelSession::open(&cfg, &kiosk("K")).await });

    let mut ws = server.accept_raw().await;
    send(&mut ws, OPEN_FRAME).await;
    assert_eq!(recv_text(&mut ws).await, "40");
    send(&mut ws, r#"44{"message":"Not authorized"}"#).await;

    let result = client.await.unwrap();
    assert!(matches!(result, Err(ChannelError::Rejected(reason)) if reason.contains("Not authorized")));
}

#[tokio::test]
async fn test_silent_server_times_out_handshake() {
    let server = FakeServer::start().await;
    let mut cfg = server.config();
    cfg.connect_timeout = Duration::from_millis(300);
    let client = tokio::spawn(async move { ChannelSession::open(&cfg, &kiosk("K")).await });

    // Upgrade the socket but never send the Engine.IO open packet.
    let _ws = server.accept_raw().await;

    let result = client.await.unwrap();
    assert!(matches!(result, Err(ChannelError::Timeout(_))));
}

// ── Reader task ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ping_is_answered_and_malformed_payload_is_skipped() {
    // Arrange
    let server = FakeServer::start().await;
    let cfg = server.config();
    let client = tokio::spawn(async move { ChannelSession::open(&cfg, &kiosk("K")).await });
    let (mut ws, _) = server.accept_joined().await;
    let mut session = client.await.unwrap().unwrap();

    // Act
    send(&mut ws, "2").await;
    let pong = recv_text(&mut ws).await;
    send(&mut ws, r#"42["printFile",{"copies":1}]"#).await;
    send(&mut ws, r#"42["someOtherEvent","x"]"#).await;
    send(&mut ws, r#"42["printFile",{"copies":2,"color":"bw"}]"#).await;

    // Assert: heartbeat answered, bad and unknown events never surface.
    assert_eq!(pong, "3");
    let event = timeout(STEP, session.next_event()).await.unwrap();
    assert_eq!(
        event,
        ChannelEvent::Display(DisplayEvent::PrintRequested(PrintSettings {
            copies: 2,
            color: "bw".to_string(),
        }))
    );
}

#[tokio::test]
async fn test_namespace_disconnect_yields_closed() {
    let server = FakeServer::start().await;
    let cfg = server.config();
    let client = tokio::spawn(async move { ChannelSession::open(&cfg, &kiosk("K")).await });
    let (mut ws, _) = server.accept_joined().await;
    let mut session = client.await.unwrap().unwrap();

    send(&mut ws, "41").await;

    let event = timeout(STEP, session.next_event()).await.unwrap();
    assert!(matches!(event, ChannelEvent::Closed { .. }));
    // Once closed, it stays closed.
    let again = timeout(STEP, session.next_event()).await.unwrap();
    assert!(matches!(again, ChannelEvent::Closed { .. }));
}

#[tokio::test]
async fn test_silent_server_past_liveness_window_yields_closed() {
    // Arrange: the server announces pingInterval + pingTimeout = 200 ms.
    let server = FakeServer::start().await;
    let cfg = server.config();
    let client = tokio::spawn(async move { ChannelSession::open(&cfg, &kiosk("K")).await });
    let (_ws, _) = server.accept_joined_with(SHORT_WINDOW_OPEN_FRAME).await;
    let mut session = client.await.unwrap().unwrap();

    // Act: the server keeps the socket open but never sends a ping.
    let event = timeout(Duration::from_secs(1), session.next_event())
        .await
        .expect("reader gives up after the liveness window");

    // Assert
    assert!(
        matches!(&event, ChannelEvent::Closed { reason } if reason.contains("no frame from server")),
        "got {event:?}"
    );
}

#[tokio::test]
async fn test_graceful_close_sends_disconnect_then_close_frame() {
    let server = FakeServer::start().await;
    let cfg = server.config();
    let client = tokio::spawn(async move { ChannelSession::open(&cfg, &kiosk("K")).await });
    let (mut ws, _) = server.accept_joined().await;
    let session = client.await.unwrap().unwrap();

    let closing = tokio::spawn(session.close());

    assert_eq!(recv_text(&mut ws).await, "41");
    let next = timeout(STEP, ws.next()).await.unwrap();
    assert!(matches!(next, Some(Ok(Message::Close(_)))));
    closing.await.unwrap();
}

#[tokio::test]
async fn test_dropping_session_closes_the_connection() {
    // Arrange
    let server = FakeServer::start().await;
    let cfg = server.config();
    let client = tokio::spawn(async move { ChannelSession::open(&cfg, &kiosk("K")).await });
    let (mut ws, _) = server.accept_joined().await;
    let session = client.await.unwrap().unwrap();

    // Act
    drop(session);

    // Assert: the server observes the socket going away without a Socket.IO
    // disconnect, and a late event has nowhere to go.
    let observed = timeout(STEP, ws.next()).await.expect("server notices the drop");
    assert!(
        !matches!(observed, Some(Ok(Message::Text(_)))),
        "no frame is sent after drop, got {observed:?}"
    );
    let _ = ws
        .send(Message::Text(r#"42["printStatus",{"status":"late"}]"#.to_string()))
        .await;
}

// ── Run loop ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_display_applies_full_print_cycle_then_fails_on_close() {
    // Arrange
    let server = FakeServer::start().await;
    let mut cfg = server.config();
    cfg.query = QueryParams::parse("?kioskId=LOBBY-7");
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.toml");
    let renderer = RecordingRenderer::new();
    let frames = renderer.clone();

    let server_side = tokio::spawn(async move {
        let (mut ws, join) = server.accept_joined().await;
        send(&mut ws, "2").await;
        assert_eq!(recv_text(&mut ws).await, "3");
        for frame in [
            r#"42["userConnectedMessage","User connected"]"#,
            r#"42["fileReceived",{"filename":"doc.pdf","size":2048}]"#,
            r#"42["printFile",{"copies":2,"color":"color"}]"#,
            r#"42["printStatus",{"status":"Print completed"}]"#,
        ] {
            send(&mut ws, frame).await;
        }
        ws.close(None).await.unwrap();
        join
    });

    // Act
    let mut store = FileStore::open(&storage).unwrap();
    let result = timeout(
        STEP,
        run_display(&cfg, &mut store, renderer, std::future::pending()),
    )
    .await
    .expect("run loop ends when the server closes");

    // Assert
    assert!(result.is_err(), "a dropped channel ends the run with an error");
    assert_eq!(server_side.await.unwrap(), r#"42["join_kiosk","LOBBY-7"]"#);
    assert_eq!(
        frames.statuses(),
        vec![
            "Waiting for user to scan QR...".to_string(),
            "User connected".to_string(),
            "File received: doc.pdf".to_string(),
            "Printing doc.pdf (2 copies, color)".to_string(),
            "Print completed".to_string(),
        ]
    );
    let last = frames.last().unwrap();
    assert!(last.file.is_none());
    assert!(last.print.is_none());
    assert!(last.join_code.is_none());

    let reopened = FileStore::open(&storage).unwrap();
    assert_eq!(reopened.get(KIOSK_ID_KEY).unwrap().as_deref(), Some("LOBBY-7"));
}

#[tokio::test]
async fn test_run_display_uses_stored_id_and_returns_state_on_shutdown() {
    // Arrange: no query; the id comes from storage.
    let server = FakeServer::start().await;
    let cfg = server.config();
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path().join("storage.toml")).unwrap();
    store.set(KIOSK_ID_KEY, "STORED-1").unwrap();
    let renderer = RecordingRenderer::new();
    let frames = renderer.clone();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server_side = tokio::spawn(async move {
        let (mut ws, join) = server.accept_joined().await;
        send(&mut ws, r#"42["userConnectedMessage","Hello"]"#).await;
        // Wait for the graceful disconnect triggered by shutdown.
        let bye = recv_text(&mut ws).await;
        (join, bye)
    });

    // Act: request shutdown once the connected screen has been drawn.
    let watcher = {
        let frames = frames.clone();
        tokio::spawn(async move {
            while frames.statuses().len() < 2 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            let _ = stop_tx.send(());
        })
    };
    let shutdown = async {
        let _ = stop_rx.await;
    };
    let state = timeout(STEP, run_display(&cfg, &mut store, renderer, shutdown))
        .await
        .unwrap()
        .unwrap();
    watcher.await.unwrap();

    // Assert
    let (join, bye) = server_side.await.unwrap();
    assert_eq!(join, r#"42["join_kiosk","STORED-1"]"#);
    assert_eq!(bye, "41");
    assert!(state.connected);
    assert_eq!(state.status, "Hello");
}
