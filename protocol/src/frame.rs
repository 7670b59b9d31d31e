//! Framing-layer packet model.
//!
//! Every websocket message carries exactly one frame. Text frames start with
//! an ASCII digit naming the [`FrameKind`]; binary frames start with the raw
//! kind byte. Whatever follows the indicator is the frame payload.

use crate::error::Error;

/// Kind of a framing-layer packet, as written on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameKind {
    /// Session handshake sent by the server; payload is JSON.
    Open = 0,
    /// Server asks the client to close the connection.
    Close = 1,
    /// Keep-alive probe.
    Ping = 2,
    /// Keep-alive reply.
    Pong = 3,
    /// Carries one messaging-layer envelope.
    Message = 4,
    /// Transport upgrade notice (unused: the client dials pre-upgraded).
    Upgrade = 5,
    /// Filler packet.
    Noop = 6,
}

impl FrameKind {
    /// Numeric value of the kind.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Digit used as the kind indicator on text frames.
    #[must_use]
    pub fn digit(self) -> char {
        char::from(b'0' + self.as_u8())
    }

    /// Map a numeric kind value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFrameKind`] for values outside `0..=6`.
    pub fn from_u8(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Self::Open),
            1 => Ok(Self::Close),
            2 => Ok(Self::Ping),
            3 => Ok(Self::Pong),
            4 => Ok(Self::Message),
            5 => Ok(Self::Upgrade),
            6 => Ok(Self::Noop),
            other => Err(Error::UnknownFrameKind(other)),
        }
    }
}

/// Which websocket message variant a frame arrived in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadFormat {
    Text,
    Binary,
}

/// One inbound framing-layer packet with its kind indicator stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub format: PayloadFormat,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Split a raw websocket payload into kind indicator and payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] for empty input or a text indicator
    /// that is not a decimal digit, and [`Error::UnknownFrameKind`] for a
    /// kind value outside the known set.
    pub fn parse(format: PayloadFormat, mut data: Vec<u8>) -> Result<Self, Error> {
        let Some(&indicator) = data.first() else {
            return Err(Error::MalformedFrame("empty frame received".to_owned()));
        };

        let value = match format {
            PayloadFormat::Text => {
                if !indicator.is_ascii_digit() {
                    return Err(Error::MalformedFrame(format!(
                        "unable to parse frame kind {:?}",
                        char::from(indicator)
                    )));
                }
                indicator - b'0'
            }
            PayloadFormat::Binary => indicator,
        };

        let kind = FrameKind::from_u8(value)?;
        data.remove(0);
        Ok(Self { kind, format, payload: data })
    }

    /// Render an outbound text frame: kind digit followed by the payload.
    #[must_use]
    pub fn encode_text(kind: FrameKind, payload: &str) -> String {
        let mut out = String::with_capacity(payload.len() + 1);
        out.push(kind.digit());
        out.push_str(payload);
        out
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
