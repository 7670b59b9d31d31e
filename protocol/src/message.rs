//! Messaging-layer envelope carried inside message frames.
//!
//! WIRE FORMAT
//! ===========
//! `<kind>[<namespace>,][<id>][<json payload array>]`
//!
//! - `kind` is one decimal digit (see [`MessageKind`]).
//! - the namespace segment is written only for a non-default namespace; on
//!   read, any namespace is rejected as unsupported.
//! - `id` is a run of decimal digits. Zero means "no id" and is never written,
//!   so an id of 0 decodes as absent.
//! - the payload is a JSON array of at most two elements:
//!   `["event name", data]`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::Error;

/// Namespace every message is scoped to. The only one this client supports.
pub const DEFAULT_NAMESPACE: &str = "/";

const MAX_PAYLOAD_ELEMENTS: usize = 2;

/// Kind of a messaging-layer envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Connect = 0,
    Disconnect = 1,
    Event = 2,
    Ack = 3,
    Error = 4,
    BinaryEvent = 5,
    BinaryAck = 6,
}

impl MessageKind {
    /// Digit written as the first character of an encoded envelope.
    #[must_use]
    pub fn digit(self) -> char {
        char::from(b'0' + self as u8)
    }

    /// Parse the leading kind digit of an envelope.
    #[must_use]
    pub fn from_digit(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(Self::Connect),
            b'1' => Some(Self::Disconnect),
            b'2' => Some(Self::Event),
            b'3' => Some(Self::Ack),
            b'4' => Some(Self::Error),
            b'5' => Some(Self::BinaryEvent),
            b'6' => Some(Self::BinaryAck),
            _ => None,
        }
    }

    /// Whether the kind carries binary attachments.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(self, Self::BinaryEvent | Self::BinaryAck)
    }
}

/// A decoded or outbound messaging-layer envelope.
#[derive(Clone, Debug)]
pub struct Message {
    pub kind: MessageKind,
    /// Routing scope. Outbound messages may name one; inbound ones are always default.
    pub namespace: String,
    /// Correlation ID; `0` means absent.
    pub id: u64,
    /// Raw JSON elements: `[0]` event name, `[1]` event data.
    pub payload: Vec<Box<RawValue>>,
}

impl Message {
    /// Envelope with the default namespace, no ID and no payload.
    #[must_use]
    pub fn empty(kind: MessageKind) -> Self {
        Self { kind, namespace: DEFAULT_NAMESPACE.to_owned(), id: 0, payload: Vec::new() }
    }

    /// Build an envelope whose payload is `[event, data]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if either element fails to serialize.
    pub fn new<T>(kind: MessageKind, id: u64, event: &str, data: &T) -> Result<Self, Error>
    where
        T: Serialize + ?Sized,
    {
        let name = serde_json::value::to_raw_value(event).map_err(Error::Encode)?;
        let data = serde_json::value::to_raw_value(data).map_err(Error::Encode)?;
        Ok(Self { kind, namespace: DEFAULT_NAMESPACE.to_owned(), id, payload: vec![name, data] })
    }

    /// Build an event envelope without correlation ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if `data` fails to serialize.
    pub fn event<T>(event: &str, data: &T) -> Result<Self, Error>
    where
        T: Serialize + ?Sized,
    {
        Self::new(MessageKind::Event, 0, event, data)
    }

    /// Render the envelope in wire form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the payload array fails to serialize.
    pub fn encode(&self) -> Result<String, Error> {
        let mut out = String::new();
        out.push(self.kind.digit());

        if !self.namespace.is_empty() && self.namespace != DEFAULT_NAMESPACE {
            out.push_str(&self.namespace);
            out.push(',');
        }

        if self.id > 0 {
            out.push_str(&self.id.to_string());
        }

        if !self.payload.is_empty() {
            let payload = serde_json::to_string(&self.payload).map_err(Error::Encode)?;
            out.push_str(&payload);
        }

        Ok(out)
    }

    /// Parse an envelope from the payload of a message frame.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedPacket`] for empty input, an unknown kind digit or
    ///   an ID that overflows `u64`.
    /// - [`Error::UnsupportedFeature`] for binary kinds and namespaces.
    /// - [`Error::Decode`] when the payload is not a JSON array.
    /// - [`Error::MalformedPacket`] when the array has more than two elements.
    pub fn decode(raw: &[u8]) -> Result<Self, Error> {
        let Some((&first, rest)) = raw.split_first() else {
            return Err(Error::MalformedPacket("message was empty".to_owned()));
        };

        let kind = MessageKind::from_digit(first).ok_or_else(|| {
            Error::MalformedPacket(format!("unable to parse message kind {:?}", char::from(first)))
        })?;
        if kind.is_binary() {
            return Err(Error::UnsupportedFeature("binary messages"));
        }

        let mut message = Self::empty(kind);
        if rest.is_empty() {
            return Ok(message);
        }

        if rest[0] == b'/' {
            return Err(Error::UnsupportedFeature("namespaces"));
        }

        let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        let (id, rest) = rest.split_at(digits);
        message.id = parse_id(id)?;

        if rest.is_empty() || kind == MessageKind::Connect {
            return Ok(message);
        }

        let payload: Vec<Box<RawValue>> = serde_json::from_slice(rest).map_err(Error::Decode)?;
        if payload.len() > MAX_PAYLOAD_ELEMENTS {
            return Err(Error::MalformedPacket(format!(
                "expected at most {MAX_PAYLOAD_ELEMENTS} payload elements, got {}",
                payload.len()
            )));
        }
        message.payload = payload;
        Ok(message)
    }

    /// Decode payload element 0 as the event name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPayload`] for an empty payload and [`Error::Decode`]
    /// when the element is not a JSON string.
    pub fn event_name(&self) -> Result<String, Error> {
        let raw = self.payload.first().ok_or(Error::NoPayload)?;
        serde_json::from_str(raw.get()).map_err(Error::Decode)
    }

    /// Decode payload element 1 into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPayload`] when there is no data element and
    /// [`Error::Decode`] when it does not match `T`.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let raw = self.payload.get(1).ok_or(Error::NoPayload)?;
        serde_json::from_str(raw.get()).map_err(Error::Decode)
    }
}

fn parse_id(digits: &[u8]) -> Result<u64, Error> {
    digits.iter().try_fold(0_u64, |acc, digit| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(digit - b'0')))
            .ok_or_else(|| Error::MalformedPacket("message id out of range".to_owned()))
    })
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
