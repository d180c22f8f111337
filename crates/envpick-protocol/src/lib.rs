//! # envpick-protocol
//!
//! The message vocabulary exchanged between the host and the embedded picker
//! surface, and the trust boundary that decides whether an inbound event may
//! be interpreted at all.
//!
//! ```text
//! InboundEvent ── is_from_embedded_surface(binding) ──▶ decode_inbound ──▶ ProtocolMessage
//! ProtocolMessage ── send(port, binding) ──▶ MessagePort::post_message
//! ```
//!
//! Every message kind is listed once in [`MESSAGE_KIND_SPECS`]; decoding and
//! sending both go through that table so direction checks stay in one place.

pub mod codec;
pub mod error;
pub mod message;
pub mod navigation;

pub use codec::{
    ChildViewId, InboundEvent, MessagePort, SurfaceBinding, decode_inbound, encode,
    is_from_embedded_surface, origin_of, send,
};
pub use error::ProtocolError;
pub use message::{
    CorrelationId, Direction, MESSAGE_KIND_SPECS, MessageKind, MessageKindSpec, ProtocolMessage,
    TokenFailure,
};
pub use navigation::{EnvironmentCandidate, NavigationResult};
