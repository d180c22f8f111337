use crate::error::ProtocolError;
use crate::message::{Direction, MessageKind, ProtocolMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use url::Url;

/// Identity of one embedded child view created by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildViewId(u64);

impl ChildViewId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for ChildViewId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// A cross-context message as the host's listener receives it.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// Transport-level origin of the sender (`scheme://host[:port]`).
    pub origin: String,
    /// The child view that posted the event, if it came from one.
    pub source: Option<ChildViewId>,
    pub data: Value,
}

/// The child view a session talks to, and the origin it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceBinding {
    view: ChildViewId,
    origin: String,
}

impl SurfaceBinding {
    pub fn new(view: ChildViewId, surface_url: &str) -> Result<Self, ProtocolError> {
        Ok(Self {
            view,
            origin: origin_of(surface_url)?,
        })
    }

    pub fn view(&self) -> ChildViewId {
        self.view
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

/// ASCII serialization of a URL's origin, e.g. `https://host.example.com`.
pub fn origin_of(url: &str) -> Result<String, ProtocolError> {
    let parsed = Url::parse(url).map_err(|e| ProtocolError::InvalidSurfaceUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(ProtocolError::InvalidSurfaceUrl {
            url: url.to_string(),
            reason: "url has an opaque origin".to_string(),
        });
    }
    Ok(origin.ascii_serialization())
}

/// Sink for host-to-surface messages.
pub trait MessagePort {
    fn post_message(
        &self,
        target: ChildViewId,
        target_origin: &str,
        payload: Value,
    ) -> Result<(), ProtocolError>;
}

/// True only for events posted by the bound child view from the bound origin.
pub fn is_from_embedded_surface(event: &InboundEvent, binding: &SurfaceBinding) -> bool {
    event.source == Some(binding.view) && event.origin == binding.origin
}

/// Decode an inbound payload through the kind table.
pub fn decode_inbound(data: &Value) -> Result<ProtocolMessage, ProtocolError> {
    let wire = data
        .get("messageType")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingKind)?;
    let kind = MessageKind::from_wire(wire)
        .ok_or_else(|| ProtocolError::UnknownKind(wire.to_string()))?;
    if kind.direction() != Direction::Inbound {
        return Err(ProtocolError::UnexpectedDirection {
            kind: kind.as_str(),
            expected: Direction::Inbound.as_str(),
        });
    }
    serde_json::from_value(data.clone()).map_err(|e| ProtocolError::Malformed {
        kind: kind.as_str(),
        reason: e.to_string(),
    })
}

/// Encode a host-to-surface message.
pub fn encode(message: &ProtocolMessage) -> Result<Value, ProtocolError> {
    let kind = message.kind();
    if kind.direction() != Direction::Outbound {
        return Err(ProtocolError::UnexpectedDirection {
            kind: kind.as_str(),
            expected: Direction::Outbound.as_str(),
        });
    }
    serde_json::to_value(message).map_err(|e| ProtocolError::Malformed {
        kind: kind.as_str(),
        reason: e.to_string(),
    })
}

pub fn send<P>(
    port: &P,
    binding: &SurfaceBinding,
    message: &ProtocolMessage,
) -> Result<(), ProtocolError>
where
    P: MessagePort + ?Sized,
{
    let payload = encode(message)?;
    port.post_message(binding.view, &binding.origin, payload)
}
