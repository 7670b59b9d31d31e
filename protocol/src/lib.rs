//! Client side of the two-layer realtime relay protocol.
//!
//! The lower layer (`engine`) speaks single-character framed packets over a
//! websocket: handshake, keep-alive and message frames. The upper layer
//! (`socket`) carries typed events inside message frames as
//! `<kind>[<id>]["event", data]` envelopes and hands every decoded
//! [`Message`] to one caller-supplied [`EventHandler`].
//!
//! ```text
//! websocket ─► transport (sole reader) ─► engine ─► socket ─► EventHandler
//! EventHandler ─► socket::send ─► engine::send_frame ─► transport (locked writer)
//! ```
//!
//! Neither layer reconnects. Loss of the connection is reported once on the
//! error stream and the caller decides what to do with the process.

pub mod engine;
pub mod error;
pub mod frame;
pub mod message;
pub mod socket;
pub mod transport;

pub use engine::{EngineClient, EngineConfig, Handshake, PacketHandler};
pub use error::{Error, Errors};
pub use frame::{Frame, FrameKind, PayloadFormat};
pub use message::{DEFAULT_NAMESPACE, Message, MessageKind};
pub use socket::{EventHandler, SocketClient, SocketConfig};
