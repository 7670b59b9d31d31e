//! Messaging-layer client on top of [`EngineClient`].
//!
//! Inbound message frames are decoded into [`Message`] envelopes and handed
//! to the caller's [`EventHandler`] on the read loop. Outbound envelopes are
//! encoded and sent as message frames.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, trace};

use crate::engine::{EngineClient, EngineConfig, PacketHandler};
use crate::error::{Error, Errors};
use crate::frame::FrameKind;
use crate::message::Message;

/// Receiver of every decoded inbound envelope.
///
/// Runs on the read loop: a slow handler delays every later frame,
/// including keep-alive answers.
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, socket: &SocketClient, message: Message) -> Result<(), Error>;
}

#[derive(Clone, Debug)]
pub struct SocketConfig {
    /// Base websocket address, e.g. `wss://host/socket.io/`.
    pub url: String,
}

/// Cheap handle to one messaging-layer connection.
#[derive(Clone)]
pub struct SocketClient {
    engine: EngineClient,
}

impl SocketClient {
    /// Dial the server and start delivering envelopes to `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] or [`Error::Connect`] when dialing fails.
    pub async fn connect(config: &SocketConfig, handler: Arc<dyn EventHandler>) -> Result<Self, Error> {
        let engine_config = EngineConfig { url: config.url.clone() };
        let engine = EngineClient::connect(&engine_config, Arc::new(PacketBridge { handler })).await?;
        Ok(Self { engine })
    }

    /// Run the messaging layer over an already-established websocket.
    #[must_use]
    pub fn from_stream<S>(stream: WebSocketStream<S>, handler: Arc<dyn EventHandler>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let engine = EngineClient::from_stream(stream, Arc::new(PacketBridge { handler }));
        Self { engine }
    }

    /// Encode `message` and send it in one message frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] when the payload fails to serialize and the
    /// engine's send errors otherwise.
    pub async fn send(&self, message: &Message) -> Result<(), Error> {
        let encoded = message.encode()?;
        trace!(packet = %encoded, "socket: sending");
        self.engine.send_frame(FrameKind::Message, &encoded).await
    }

    /// Send an event envelope `["event", data]` without correlation ID.
    ///
    /// # Errors
    ///
    /// Same as [`SocketClient::send`].
    pub async fn emit<T>(&self, event: &str, data: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        self.send(&Message::event(event, data)?).await
    }

    #[must_use]
    pub fn errors(&self) -> Errors {
        self.engine.errors()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.engine.is_connected()
    }

    /// # Errors
    ///
    /// Returns [`Error::Send`] when the close frame cannot be written.
    pub async fn close(&self) -> Result<(), Error> {
        self.engine.close().await
    }

    /// The framing layer underneath.
    #[must_use]
    pub fn engine(&self) -> &EngineClient {
        &self.engine
    }
}

struct PacketBridge {
    handler: Arc<dyn EventHandler>,
}

#[async_trait::async_trait]
impl PacketHandler for PacketBridge {
    async fn on_text(&self, engine: &EngineClient, payload: &[u8]) -> Result<(), Error> {
        let message = Message::decode(payload)?;
        debug!(kind = ?message.kind, id = message.id, "socket: message received");
        let socket = SocketClient { engine: engine.clone() };
        self.handler.handle(&socket, message).await
    }

    async fn on_binary(&self, engine: &EngineClient, payload: &[u8]) -> Result<(), Error> {
        self.on_text(engine, payload).await
    }
}

#[cfg(test)]
#[path = "socket_test.rs"]
mod tests;
