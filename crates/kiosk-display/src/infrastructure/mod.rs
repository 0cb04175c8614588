//! Infrastructure layer: everything that touches a socket, a file, or the
//! terminal.
//!
//! - [`channel`]: the Socket.IO session joined to the kiosk's room.
//! - [`storage`]: the TOML key-value file holding the last kiosk id.
//! - [`terminal`]: the text renderer for the kiosk screen.
//! - [`recording`]: an in-memory renderer for tests.

pub mod channel;
pub mod recording;
pub mod storage;
pub mod terminal;

pub use channel::{websocket_endpoint, ChannelError, ChannelEvent, ChannelSession};
pub use recording::RecordingRenderer;
pub use storage::{default_storage_path, FileStore, StorageError};
pub use terminal::{render_view, TerminalRenderer};
