//! Error taxonomy shared by every protocol layer, plus the asynchronous
//! error stream the background tasks report into.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite;

/// Capacity of the asynchronous error stream. Producers wait when it is full.
pub const ERROR_STREAM_CAPACITY: usize = 10;

/// Errors produced by the transport, framing and messaging layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The socket address could not be turned into a websocket URL.
    #[error("invalid socket URL: {0}")]
    InvalidUrl(String),

    /// Dialing the websocket failed.
    #[error("websocket connect failed: {0}")]
    Connect(Box<tungstenite::Error>),

    /// A frame was sent after the connection was marked closed.
    #[error("websocket is not connected")]
    NotConnected,

    /// Writing a frame to a live connection failed.
    #[error("unable to transmit frame: {0}")]
    Send(Box<tungstenite::Error>),

    /// Reading the next frame from the websocket failed.
    #[error("websocket receive failed: {0}")]
    Receive(Box<tungstenite::Error>),

    /// The websocket stream ended; no further frames will arrive.
    #[error("websocket connection closed")]
    ConnectionClosed,

    /// A transport frame was empty or carried an unreadable kind indicator.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A frame carried a kind value outside the known set.
    #[error("unknown frame kind {0}")]
    UnknownFrameKind(u8),

    /// A messaging envelope could not be parsed outside of its JSON payload.
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// The peer used a protocol feature this client does not implement.
    #[error("{0} are not supported")]
    UnsupportedFeature(&'static str),

    /// JSON in an inbound frame could not be decoded.
    #[error("unable to decode JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// An outbound payload could not be encoded as JSON.
    #[error("unable to encode JSON: {0}")]
    Encode(#[source] serde_json::Error),

    /// The message has no payload element at the requested position.
    #[error("message carries no payload")]
    NoPayload,

    /// The registered event handler failed.
    #[error("event handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary handler failure.
    pub fn handler<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Handler(Box::new(error))
    }
}

/// Read side of a connection's asynchronous error stream.
///
/// Background tasks (the read loop and the keep-alive ticker) push every
/// failure they cannot return to a caller. Clones share one queue, so each
/// error is observed by exactly one reader.
#[derive(Clone)]
pub struct Errors {
    rx: Arc<Mutex<mpsc::Receiver<Error>>>,
}

impl Errors {
    pub(crate) fn channel() -> (mpsc::Sender<Error>, Self) {
        let (tx, rx) = mpsc::channel(ERROR_STREAM_CAPACITY);
        (tx, Self { rx: Arc::new(Mutex::new(rx)) })
    }

    /// Wait for the next reported error.
    ///
    /// Returns `None` only once every producer is gone.
    pub async fn recv(&self) -> Option<Error> {
        self.rx.lock().await.recv().await
    }

    /// Take an already queued error without waiting.
    ///
    /// Also returns `None` while another clone is blocked in [`Errors::recv`],
    /// since that clone holds the receiver. An empty result therefore does not
    /// prove the queue is empty.
    pub fn try_recv(&self) -> Option<Error> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
