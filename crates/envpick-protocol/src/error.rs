//! Error types for codec operations.

/// Errors raised while decoding, validating, or sending protocol messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The payload carries no `messageType` string.
    #[error("message has no messageType")]
    MissingKind,

    /// The `messageType` is not part of the vocabulary.
    #[error("unknown message kind: {0}")]
    UnknownKind(String),

    /// The kind exists but travels the other way.
    #[error("message kind {kind} is not valid {expected}")]
    UnexpectedDirection {
        kind: &'static str,
        expected: &'static str,
    },

    /// The kind is known but its payload does not match.
    #[error("malformed {kind} message: {reason}")]
    Malformed { kind: &'static str, reason: String },

    /// The picker URL could not be parsed into an origin.
    #[error("invalid surface url `{url}`: {reason}")]
    InvalidSurfaceUrl { url: String, reason: String },

    /// The target child view is gone.
    #[error("message port closed for child view {0}")]
    PortClosed(u64),
}
