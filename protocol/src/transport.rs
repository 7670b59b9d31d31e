//! Frame transport: one websocket, one reader, one locked writer.
//!
//! DESIGN
//! ======
//! The websocket is split on open. The write half sits behind a mutex held
//! for exactly one frame write, so concurrent senders never interleave. The
//! read half moves into a [`FrameReader`] whose spawned loop is the only code
//! that ever receives from the socket.
//!
//! The connected flag is shared between both halves: the read loop clears it
//! when the peer closes or the stream ends, and every send checks it first.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;
use crate::frame::{Frame, FrameKind, PayloadFormat};

/// Protocol revision requested at dial time.
pub const PROTOCOL_VERSION: &str = "3";
/// Transport mode requested at dial time; skips long-poll negotiation.
pub const TRANSPORT_MODE: &str = "websocket";

type WsSink = Pin<Box<dyn Sink<Message, Error = tungstenite::Error> + Send>>;
type WsSource = Pin<Box<dyn Stream<Item = Result<Message, tungstenite::Error>> + Send>>;

/// Receiver of every data frame the read loop pulls off the socket.
#[async_trait::async_trait]
pub trait FrameDispatch: Send + Sync + 'static {
    /// Handle one websocket payload. Errors are pushed onto the error stream.
    async fn dispatch(&self, format: PayloadFormat, data: Vec<u8>) -> Result<(), Error>;
}

/// Write half of a connection plus its connected flag.
pub struct FrameTransport {
    sink: Mutex<WsSink>,
    connected: Arc<AtomicBool>,
}

/// Read half of a connection, consumed by [`FrameReader::spawn`].
pub struct FrameReader {
    source: WsSource,
    connected: Arc<AtomicBool>,
}

impl FrameTransport {
    /// Dial `address` with the fixed protocol query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unusable address and
    /// [`Error::Connect`] when the websocket handshake fails.
    pub async fn open(address: &str) -> Result<(Self, FrameReader), Error> {
        let url = dial_url(address)?;
        info!(url = %url, "transport: dialing");
        let (stream, response) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::Connect(Box::new(e)))?;
        debug!(status = %response.status(), "transport: connected");
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already-established websocket.
    #[must_use]
    pub fn from_stream<S>(stream: WebSocketStream<S>) -> (Self, FrameReader)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (sink, source) = stream.split();
        let connected = Arc::new(AtomicBool::new(true));
        let transport = Self { sink: Mutex::new(Box::pin(sink)), connected: Arc::clone(&connected) };
        let reader = FrameReader { source: Box::pin(source), connected };
        (transport, reader)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Write one text frame: kind digit followed by `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] once the connection is closed and
    /// [`Error::Send`] when the websocket write fails.
    pub async fn send_frame(&self, kind: FrameKind, payload: &str) -> Result<(), Error> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let text = Frame::encode_text(kind, payload);
        let mut sink = self.sink.lock().await;
        sink.send(Message::text(text)).await.map_err(|e| {
            warn!(error = %e, ?kind, "transport: frame write failed");
            Error::Send(Box::new(e))
        })
    }

    /// Close the websocket. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Send`] when the close frame cannot be written.
    pub async fn close(&self) -> Result<(), Error> {
        self.connected.store(false, Ordering::Release);
        let mut sink = self.sink.lock().await;
        match sink.close().await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(Error::Send(Box::new(e))),
        }
    }
}

impl FrameReader {
    /// Start the read loop.
    ///
    /// Data frames go to `dispatch` in arrival order. Receive and dispatch
    /// failures are pushed onto `errors` and the loop keeps reading. When the
    /// peer sends a close frame or the stream ends, the connection is marked
    /// closed and [`Error::ConnectionClosed`] is reported once.
    pub fn spawn<D: FrameDispatch>(self, dispatch: D, errors: mpsc::Sender<Error>) -> JoinHandle<()> {
        let Self { mut source, connected } = self;
        tokio::spawn(async move {
            while let Some(next) = source.next().await {
                let result = match next {
                    Ok(Message::Text(text)) => dispatch.dispatch(PayloadFormat::Text, text.as_bytes().to_vec()).await,
                    Ok(Message::Binary(data)) => dispatch.dispatch(PayloadFormat::Binary, data.to_vec()).await,
                    Ok(Message::Close(reason)) => {
                        connected.store(false, Ordering::Release);
                        debug!(?reason, "transport: peer closed websocket");
                        break;
                    }
                    // Websocket-level ping/pong are answered by tungstenite.
                    Ok(_) => Ok(()),
                    Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => break,
                    Err(e) => Err(Error::Receive(Box::new(e))),
                };

                if let Err(error) = result {
                    if errors.send(error).await.is_err() {
                        warn!("transport: error stream dropped");
                    }
                }
            }

            connected.store(false, Ordering::Release);
            debug!("transport: read loop finished");
            let _ = errors.send(Error::ConnectionClosed).await;
        })
    }
}

/// Build the websocket URL for `address`.
///
/// `http`/`https` are mapped to `ws`/`wss`. The `EIO` and `transport` query
/// parameters are replaced; every other parameter is kept.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] when `address` does not parse or uses a
/// scheme other than `ws`, `wss`, `http` or `https`.
pub fn dial_url(address: &str) -> Result<Url, Error> {
    let mut url = Url::parse(address).map_err(|e| Error::InvalidUrl(format!("{address}: {e}")))?;

    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => return Err(Error::InvalidUrl(format!("{address}: unsupported scheme {other}"))),
    };
    if url.scheme() != scheme {
        url.set_scheme(scheme)
            .map_err(|()| Error::InvalidUrl(format!("{address}: unable to switch scheme to {scheme}")))?;
    }

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "EIO" && key != "transport")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("EIO", PROTOCOL_VERSION)
        .append_pair("transport", TRANSPORT_MODE);

    Ok(url)
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
