//! Framing-layer client.
//!
//! DESIGN
//! ======
//! Every inbound frame is classified by its kind indicator:
//! - `open`    → store the handshake once, start the keep-alive ticker
//! - `close`   → close the transport
//! - `ping`    → answer with `pong` straight from the read loop
//! - `message` → strip the indicator, hand the payload to the [`PacketHandler`]
//! - `pong`, `upgrade`, `noop` → ignored
//!
//! The keep-alive task holds only a weak reference to the client and checks
//! the connected flag before every ping, so it stops at most one interval
//! after the connection closes.

use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

use crate::error::{Error, Errors};
use crate::frame::{Frame, FrameKind, PayloadFormat};
use crate::transport::{FrameDispatch, FrameReader, FrameTransport};

/// Session parameters announced by the server in the `open` frame.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds.
    pub ping_timeout: u64,
    /// Milliseconds.
    pub ping_interval: u64,
}

impl Handshake {
    #[must_use]
    pub fn keepalive_period(&self) -> Duration {
        Duration::from_millis(self.ping_interval)
    }
}

/// Callbacks for the payload of `message` frames.
#[async_trait::async_trait]
pub trait PacketHandler: Send + Sync {
    async fn on_text(&self, engine: &EngineClient, payload: &[u8]) -> Result<(), Error>;
    async fn on_binary(&self, engine: &EngineClient, payload: &[u8]) -> Result<(), Error>;
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Base websocket address, e.g. `wss://host/socket.io/`.
    pub url: String,
}

/// Cheap handle to one framing-layer connection.
#[derive(Clone)]
pub struct EngineClient {
    shared: Arc<Shared>,
}

struct Shared {
    transport: FrameTransport,
    handshake: OnceLock<Handshake>,
    handler: Arc<dyn PacketHandler>,
    errors_tx: mpsc::Sender<Error>,
    errors: Errors,
}

impl EngineClient {
    /// Dial the server and start the read loop.
    ///
    /// Returns as soon as the websocket is open; the handshake and keep-alive
    /// follow asynchronously.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] or [`Error::Connect`] when dialing fails.
    pub async fn connect(config: &EngineConfig, handler: Arc<dyn PacketHandler>) -> Result<Self, Error> {
        let (transport, reader) = FrameTransport::open(&config.url).await?;
        Ok(Self::start(transport, reader, handler))
    }

    /// Run the framing layer over an already-established websocket.
    #[must_use]
    pub fn from_stream<S>(stream: WebSocketStream<S>, handler: Arc<dyn PacketHandler>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (transport, reader) = FrameTransport::from_stream(stream);
        Self::start(transport, reader, handler)
    }

    fn start(transport: FrameTransport, reader: FrameReader, handler: Arc<dyn PacketHandler>) -> Self {
        let (errors_tx, errors) = Errors::channel();
        let client = Self {
            shared: Arc::new(Shared { transport, handshake: OnceLock::new(), handler, errors_tx: errors_tx.clone(), errors }),
        };
        reader.spawn(client.clone(), errors_tx);
        client
    }

    /// Stream of failures from the read loop and keep-alive task.
    #[must_use]
    pub fn errors(&self) -> Errors {
        self.shared.errors.clone()
    }

    /// Handshake received in the `open` frame, once it has arrived.
    #[must_use]
    pub fn handshake(&self) -> Option<&Handshake> {
        self.shared.handshake.get()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.transport.is_connected()
    }

    /// Send one frame of `kind` with a text payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] after disconnect and [`Error::Send`]
    /// when the write fails.
    pub async fn send_frame(&self, kind: FrameKind, payload: &str) -> Result<(), Error> {
        self.shared.transport.send_frame(kind, payload).await
    }

    /// Close the connection. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Send`] when the close frame cannot be written.
    pub async fn close(&self) -> Result<(), Error> {
        self.shared.transport.close().await
    }

    async fn report(&self, error: Error) {
        if self.shared.errors_tx.send(error).await.is_err() {
            warn!("engine: error stream closed");
        }
    }

    fn open_session(&self, payload: &[u8]) -> Result<(), Error> {
        let handshake: Handshake = serde_json::from_slice(payload).map_err(Error::Decode)?;
        info!(sid = %handshake.sid, ping_interval = handshake.ping_interval, ping_timeout = handshake.ping_timeout, "engine: session opened");

        if self.shared.handshake.set(handshake).is_err() {
            warn!("engine: duplicate open frame ignored");
            return Ok(());
        }

        if let Some(handshake) = self.shared.handshake.get() {
            let period = handshake.keepalive_period();
            if period.is_zero() {
                warn!("engine: ping interval is zero, keep-alive disabled");
            } else {
                spawn_keepalive(Arc::downgrade(&self.shared), period);
            }
        }
        Ok(())
    }

    async fn handle_frame(&self, frame: Frame) -> Result<(), Error> {
        match frame.kind {
            FrameKind::Open => self.open_session(&frame.payload),
            FrameKind::Close => {
                debug!("engine: server requested close");
                self.close().await
            }
            FrameKind::Ping => self.send_frame(FrameKind::Pong, "").await,
            FrameKind::Message => match frame.format {
                PayloadFormat::Text => self.shared.handler.on_text(self, &frame.payload).await,
                PayloadFormat::Binary => self.shared.handler.on_binary(self, &frame.payload).await,
            },
            FrameKind::Pong | FrameKind::Upgrade | FrameKind::Noop => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl FrameDispatch for EngineClient {
    async fn dispatch(&self, format: PayloadFormat, data: Vec<u8>) -> Result<(), Error> {
        let frame = Frame::parse(format, data)?;
        self.handle_frame(frame).await
    }
}

fn spawn_keepalive(shared: Weak<Shared>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(shared) = shared.upgrade() else {
                break;
            };
            let client = EngineClient { shared };
            if !client.is_connected() {
                break;
            }
            match client.send_frame(FrameKind::Ping, "").await {
                Ok(()) => {}
                Err(Error::NotConnected) => break,
                Err(error) => client.report(error).await,
            }
        }
        debug!("engine: keep-alive stopped");
    });
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
