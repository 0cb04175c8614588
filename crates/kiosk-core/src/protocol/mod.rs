//! Messaging channel protocol: packet codec and event mapping.
//!
//! The kiosk talks to the messaging server with Socket.IO v4 running over a
//! plain WebSocket.  Two layers are involved:
//!
//! - [`packet`] encodes/decodes the text frames (Engine.IO framing with
//!   Socket.IO packets inside `message` frames).
//! - [`events`] maps named server events onto [`crate::DisplayEvent`]s and
//!   builds the outbound `join_kiosk` event.

pub mod events;
pub mod packet;

pub use events::{decode_display_event, join_packet, EventError};
pub use packet::{decode_packet, encode_packet, EnginePacket, OpenHandshake, PacketError, SocketPacket};
