//! Text codec for Socket.IO v4 packets carried in Engine.IO v4 frames.
//!
//! Wire format (one WebSocket text frame per packet):
//! ```text
//! Engine.IO:  <type:1 digit><payload>
//!             0 open  {json handshake}
//!             1 close
//!             2 ping  [probe data]
//!             3 pong  [probe data]
//!             4 message <Socket.IO packet>
//!             5 upgrade
//!             6 noop
//!
//! Socket.IO:  <type:1 digit>[<namespace>,][<ack id>][<json data>]
//!             0 CONNECT  1 DISCONNECT  2 EVENT  3 ACK  4 CONNECT_ERROR
//! ```
//!
//! Examples:
//! ```text
//! 0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}
//! 40
//! 42["join_kiosk","KIOSK-42"]
//! 42/admin,7["fileReceived",{"filename":"a.pdf"}]
//! ```
//!
//! Binary packets (Socket.IO types 5 and 6) need attachment frames and are
//! not supported; the kiosk events are all plain JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The namespace used when a packet does not name one.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Errors that can occur while decoding or encoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// The frame (or the Socket.IO part of a message frame) was empty.
    #[error("empty packet")]
    Empty,

    /// The first character is not a known Engine.IO packet type.
    #[error("unknown Engine.IO packet type: {0:?}")]
    UnknownEngineType(char),

    /// The Socket.IO packet type digit is not recognised.
    #[error("unknown Socket.IO packet type: {0:?}")]
    UnknownSocketType(char),

    /// The packet is valid Socket.IO but uses a feature this codec omits.
    #[error("unsupported packet: {0}")]
    Unsupported(&'static str),

    /// The JSON part of the packet could not be parsed or produced.
    #[error("malformed JSON payload: {0}")]
    MalformedJson(String),

    /// The ack id digits do not fit in a `u64`.
    #[error("invalid ack id")]
    InvalidAckId,

    /// An EVENT packet whose data is not an array starting with a string.
    #[error("event packet without a name")]
    MissingEventName,

    /// An ACK packet without an ack id.
    #[error("ack packet without an ack id")]
    MissingAckId,
}

/// Handshake sent by the server in the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    /// Engine.IO session id.
    pub sid: String,
    /// Transports the session could be upgraded to (empty over WebSocket).
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Interval between server pings, in milliseconds.
    pub ping_interval: u64,
    /// How long the server waits for a pong, in milliseconds.
    pub ping_timeout: u64,
    /// Largest payload the server accepts, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

impl OpenHandshake {
    /// Longest silence after which the connection must be considered dead.
    ///
    /// The server pings every `pingInterval`; if neither a ping nor any other
    /// frame arrives within `pingInterval + pingTimeout` the link is gone.
    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// One Engine.IO frame.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    /// Heartbeat from the server; must be answered with `Pong` carrying the same data.
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// One Socket.IO packet (the payload of an Engine.IO `message`).
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Client: request to join a namespace.  Server: confirmation (data has `sid`).
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    /// Named event with JSON arguments.
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: u64,
        args: Vec<Value>,
    },
    /// Server refused the namespace connection.
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    /// Builds an EVENT packet on the default namespace without an ack id.
    pub fn event(name: impl Into<String>, args: Vec<Value>) -> Self {
        SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            name: name.into(),
            args,
        }
    }

    /// Builds a CONNECT packet for the default namespace.
    pub fn connect() -> Self {
        SocketPacket::Connect {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data: None,
        }
    }

    /// Builds a DISCONNECT packet for the default namespace.
    pub fn disconnect() -> Self {
        SocketPacket::Disconnect {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one WebSocket text frame.
///
/// # Errors
///
/// Returns [`PacketError`] if the frame is empty, uses an unknown type, or
/// carries malformed JSON.
///
/// # Examples
///
/// ```rust
/// use kiosk_core::protocol::packet::{decode_packet, EnginePacket, SocketPacket};
///
/// let packet = decode_packet(r#"42["printStatus",{"status":"done"}]"#).unwrap();
/// match packet {
///     EnginePacket::Message(SocketPacket::Event { name, .. }) => assert_eq!(name, "printStatus"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub fn decode_packet(frame: &str) -> Result<EnginePacket, PacketError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(PacketError::Empty)?;
    let rest = chars.as_str();

    match kind {
        '0' => {
            let handshake: OpenHandshake = serde_json::from_str(rest)
                .map_err(|e| PacketError::MalformedJson(e.to_string()))?;
            Ok(EnginePacket::Open(handshake))
        }
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(rest.to_string())),
        '3' => Ok(EnginePacket::Pong(rest.to_string())),
        '4' => decode_socket_packet(rest).map(EnginePacket::Message),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(PacketError::UnknownEngineType(other)),
    }
}

/// Encodes one Engine.IO packet as a WebSocket text frame.
///
/// # Errors
///
/// Returns [`PacketError::MalformedJson`] if a JSON payload cannot be
/// serialized (only possible for non-string map keys in custom values).
///
/// # Examples
///
/// ```rust
/// use kiosk_core::protocol::packet::{encode_packet, EnginePacket, SocketPacket};
/// use serde_json::json;
///
/// let frame = encode_packet(&EnginePacket::Message(SocketPacket::event(
///     "join_kiosk",
///     vec![json!("K1")],
/// )))
/// .unwrap();
/// assert_eq!(frame, r#"42["join_kiosk","K1"]"#);
/// ```
pub fn encode_packet(packet: &EnginePacket) -> Result<String, PacketError> {
    let frame = match packet {
        EnginePacket::Open(handshake) => format!("0{}", to_json(handshake)?),
        EnginePacket::Close => "1".to_string(),
        EnginePacket::Ping(data) => format!("2{data}"),
        EnginePacket::Pong(data) => format!("3{data}"),
        EnginePacket::Message(inner) => format!("4{}", encode_socket_packet(inner)?),
        EnginePacket::Upgrade => "5".to_string(),
        EnginePacket::Noop => "6".to_string(),
    };
    Ok(frame)
}

// ── Socket.IO layer ───────────────────────────────────────────────────────────

fn decode_socket_packet(s: &str) -> Result<SocketPacket, PacketError> {
    let mut chars = s.chars();
    let kind = chars.next().ok_or(PacketError::Empty)?;
    let mut rest = chars.as_str();

    match kind {
        '0'..='4' => {}
        '5' | '6' => return Err(PacketError::Unsupported("binary attachments")),
        other => return Err(PacketError::UnknownSocketType(other)),
    }

    // Optional namespace: "/name," (the comma is dropped).
    let namespace = if rest.starts_with('/') {
        match rest.find(',') {
            Some(i) => {
                let ns = &rest[..i];
                rest = &rest[i + 1..];
                ns.to_string()
            }
            None => {
                let ns = rest;
                rest = "";
                ns.to_string()
            }
        }
    } else {
        DEFAULT_NAMESPACE.to_string()
    };

    // Optional ack id: a run of ASCII digits directly before the JSON data.
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let ack_id = if digits > 0 {
        Some(
            rest[..digits]
                .parse::<u64>()
                .map_err(|_| PacketError::InvalidAckId)?,
        )
    } else {
        None
    };
    rest = &rest[digits..];

    let data: Option<Value> = if rest.is_empty() {
        None
    } else {
        Some(serde_json::from_str(rest).map_err(|e| PacketError::MalformedJson(e.to_string()))?)
    };

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace, data }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let mut items = match data {
                Some(Value::Array(items)) => items,
                _ => return Err(PacketError::MissingEventName),
            };
            if items.is_empty() {
                return Err(PacketError::MissingEventName);
            }
            let name = match items.remove(0) {
                Value::String(name) => name,
                _ => return Err(PacketError::MissingEventName),
            };
            Ok(SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args: items,
            })
        }
        '3' => {
            let ack_id = ack_id.ok_or(PacketError::MissingAckId)?;
            let args = match data {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            Ok(SocketPacket::Ack {
                namespace,
                ack_id,
                args,
            })
        }
        _ => Ok(SocketPacket::ConnectError { namespace, data }),
    }
}

fn encode_socket_packet(packet: &SocketPacket) -> Result<String, PacketError> {
    let (kind, namespace, ack_id, data) = match packet {
        SocketPacket::Connect { namespace, data } => ('0', namespace, None, data.clone()),
        SocketPacket::Disconnect { namespace } => ('1', namespace, None, None),
        SocketPacket::Event {
            namespace,
            ack_id,
            name,
            args,
        } => {
            let mut items = Vec::with_capacity(args.len() + 1);
            items.push(Value::String(name.clone()));
            items.extend(args.iter().cloned());
            ('2', namespace, *ack_id, Some(Value::Array(items)))
        }
        SocketPacket::Ack {
            namespace,
            ack_id,
            args,
        } => ('3', namespace, Some(*ack_id), Some(Value::Array(args.clone()))),
        SocketPacket::ConnectError { namespace, data } => ('4', namespace, None, data.clone()),
    };

    let mut out = String::new();
    out.push(kind);
    if namespace != DEFAULT_NAMESPACE {
        out.push_str(namespace);
        out.push(',');
    }
    if let Some(id) = ack_id {
        out.push_str(&id.to_string());
    }
    if let Some(data) = data {
        out.push_str(&to_json(&data)?);
    }
    Ok(out)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, PacketError> {
    serde_json::to_string(value).map_err(|e| PacketError::MalformedJson(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open_handshake() {
        // Arrange
        let frame = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

        // Act
        let packet = decode_packet(frame).unwrap();

        // Assert
        match packet {
            EnginePacket::Open(h) => {
                assert_eq!(h.sid, "lv_VI97HAXpY6yYWAAAC");
                assert_eq!(h.ping_interval, 25000);
                assert_eq!(h.ping_timeout, 20000);
                assert_eq!(h.max_payload, Some(1_000_000));
                assert_eq!(h.liveness_window(), Duration::from_secs(45));
            }
            other => panic!("expected Open, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_ping_and_probe() {
        assert_eq!(decode_packet("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(
            decode_packet("2probe").unwrap(),
            EnginePacket::Ping("probe".to_string())
        );
    }

    #[test]
    fn test_pong_echoes_ping_data() {
        let frame = encode_packet(&EnginePacket::Pong("probe".to_string())).unwrap();
        assert_eq!(frame, "3probe");
    }

    #[test]
    fn test_decode_connect_confirmation() {
        let packet = decode_packet(r#"40{"sid":"wZX3oN0bSVIhsaknAAAI"}"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Connect {
                namespace: "/".to_string(),
                data: Some(json!({"sid": "wZX3oN0bSVIhsaknAAAI"})),
            })
        );
    }

    #[test]
    fn test_encode_default_namespace_connect() {
        let frame = encode_packet(&EnginePacket::Message(SocketPacket::connect())).unwrap();
        assert_eq!(frame, "40");
    }

    #[test]
    fn test_decode_event_with_string_argument() {
        let packet = decode_packet(r#"42["userConnectedMessage","User joined"]"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Event {
                namespace: "/".to_string(),
                ack_id: None,
                name: "userConnectedMessage".to_string(),
                args: vec![json!("User joined")],
            })
        );
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack_id() {
        let packet = decode_packet(r#"42/kiosk,17["fileReceived",{"filename":"a.pdf"}]"#).unwrap();
        match packet {
            EnginePacket::Message(SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args,
            }) => {
                assert_eq!(namespace, "/kiosk");
                assert_eq!(ack_id, Some(17));
                assert_eq!(name, "fileReceived");
                assert_eq!(args, vec![json!({"filename": "a.pdf"})]);
            }
            other => panic!("expected Event, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_event_with_namespace_and_ack_id() {
        let packet = EnginePacket::Message(SocketPacket::Event {
            namespace: "/kiosk".to_string(),
            ack_id: Some(3),
            name: "join_kiosk".to_string(),
            args: vec![json!("K1")],
        });
        assert_eq!(
            encode_packet(&packet).unwrap(),
            r#"42/kiosk,3["join_kiosk","K1"]"#
        );
    }

    #[test]
    fn test_decode_namespace_disconnect() {
        assert_eq!(
            decode_packet("41/admin,").unwrap(),
            EnginePacket::Message(SocketPacket::Disconnect {
                namespace: "/admin".to_string()
            })
        );
    }

    #[test]
    fn test_decode_ack() {
        let packet = decode_packet(r#"433["ok"]"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Ack {
                namespace: "/".to_string(),
                ack_id: 3,
                args: vec![json!("ok")],
            })
        );
    }

    #[test]
    fn test_decode_ack_without_id_is_error() {
        assert_eq!(decode_packet(r#"43["ok"]"#), Err(PacketError::MissingAckId));
    }

    #[test]
    fn test_decode_connect_error() {
        let packet = decode_packet(r#"44{"message":"Not authorized"}"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::ConnectError {
                namespace: "/".to_string(),
                data: Some(json!({"message": "Not authorized"})),
            })
        );
    }

    #[test]
    fn test_decode_binary_event_is_unsupported() {
        assert_eq!(
            decode_packet(r#"451-["upload",{"_placeholder":true,"num":0}]"#),
            Err(PacketError::Unsupported("binary attachments"))
        );
    }

    #[test]
    fn test_decode_empty_frame_is_error() {
        assert_eq!(decode_packet(""), Err(PacketError::Empty));
        assert_eq!(decode_packet("4"), Err(PacketError::Empty));
    }

    #[test]
    fn test_decode_unknown_types() {
        assert_eq!(decode_packet("9"), Err(PacketError::UnknownEngineType('9')));
        assert_eq!(decode_packet("4x"), Err(PacketError::UnknownSocketType('x')));
    }

    #[test]
    fn test_decode_event_without_name_is_error() {
        assert_eq!(decode_packet("42[]"), Err(PacketError::MissingEventName));
        assert_eq!(decode_packet("42[1,2]"), Err(PacketError::MissingEventName));
        assert_eq!(decode_packet(r#"42{"a":1}"#), Err(PacketError::MissingEventName));
    }

    #[test]
    fn test_decode_malformed_json_is_error() {
        assert!(matches!(
            decode_packet(r#"42["printFile",{"#),
            Err(PacketError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_close_noop_upgrade_frames() {
        assert_eq!(decode_packet("1").unwrap(), EnginePacket::Close);
        assert_eq!(decode_packet("5").unwrap(), EnginePacket::Upgrade);
        assert_eq!(decode_packet("6").unwrap(), EnginePacket::Noop);
        assert_eq!(encode_packet(&EnginePacket::Close).unwrap(), "1");
    }

    #[test]
    fn test_encode_disconnect_default_namespace() {
        let frame = encode_packet(&EnginePacket::Message(SocketPacket::disconnect())).unwrap();
        assert_eq!(frame, "41");
    }
}
