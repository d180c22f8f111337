use crate::navigation::NavigationResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Opaque correlation id pairing a `get-token` with its reply.
///
/// Whatever JSON value the surface sent is echoed back unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CorrelationId(pub Value);

impl From<u64> for CorrelationId {
    fn from(value: u64) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reason carried by a `token-fail` reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenFailure {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "messageType", rename_all = "kebab-case")]
pub enum ProtocolMessage {
    Ready,
    #[serde(rename_all = "camelCase")]
    GetToken {
        #[serde(default)]
        token_request_id: CorrelationId,
        #[serde(default)]
        disable_redirect: bool,
    },
    WelcomeCancel,
    #[serde(rename_all = "camelCase")]
    WelcomeEnvironmentSelected { env_id: String },
    HostReady,
    #[serde(rename_all = "camelCase")]
    ContextProvide { context_navigation: NavigationResult },
    #[serde(rename_all = "camelCase")]
    Token {
        token: String,
        token_request_id: CorrelationId,
    },
    #[serde(rename_all = "camelCase")]
    TokenFail {
        reason: TokenFailure,
        token_request_id: CorrelationId,
    },
}

impl ProtocolMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Ready => MessageKind::Ready,
            Self::GetToken { .. } => MessageKind::GetToken,
            Self::WelcomeCancel => MessageKind::WelcomeCancel,
            Self::WelcomeEnvironmentSelected { .. } => MessageKind::WelcomeEnvironmentSelected,
            Self::HostReady => MessageKind::HostReady,
            Self::ContextProvide { .. } => MessageKind::ContextProvide,
            Self::Token { .. } => MessageKind::Token,
            Self::TokenFail { .. } => MessageKind::TokenFail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Ready,
    GetToken,
    WelcomeCancel,
    WelcomeEnvironmentSelected,
    HostReady,
    ContextProvide,
    Token,
    TokenFail,
}

/// Which side of the channel originates a message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Surface to host.
    Inbound,
    /// Host to surface.
    Outbound,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MessageKindSpec {
    pub kind: MessageKind,
    pub wire: &'static str,
    pub direction: Direction,
    /// Ends the picker interaction.
    pub terminal: bool,
}

pub const MESSAGE_KIND_SPECS: &[MessageKindSpec] = &[
    MessageKindSpec {
        kind: MessageKind::Ready,
        wire: "ready",
        direction: Direction::Inbound,
        terminal: false,
    },
    MessageKindSpec {
        kind: MessageKind::GetToken,
        wire: "get-token",
        direction: Direction::Inbound,
        terminal: false,
    },
    MessageKindSpec {
        kind: MessageKind::WelcomeCancel,
        wire: "welcome-cancel",
        direction: Direction::Inbound,
        terminal: true,
    },
    MessageKindSpec {
        kind: MessageKind::WelcomeEnvironmentSelected,
        wire: "welcome-environment-selected",
        direction: Direction::Inbound,
        terminal: true,
    },
    MessageKindSpec {
        kind: MessageKind::HostReady,
        wire: "host-ready",
        direction: Direction::Outbound,
        terminal: false,
    },
    MessageKindSpec {
        kind: MessageKind::ContextProvide,
        wire: "context-provide",
        direction: Direction::Outbound,
        terminal: false,
    },
    MessageKindSpec {
        kind: MessageKind::Token,
        wire: "token",
        direction: Direction::Outbound,
        terminal: false,
    },
    MessageKindSpec {
        kind: MessageKind::TokenFail,
        wire: "token-fail",
        direction: Direction::Outbound,
        terminal: false,
    },
];

impl MessageKind {
    pub fn from_wire(value: &str) -> Option<Self> {
        let wire = value.trim();
        MESSAGE_KIND_SPECS
            .iter()
            .find(|spec| spec.wire == wire)
            .map(|spec| spec.kind)
    }

    pub fn spec(self) -> &'static MessageKindSpec {
        MESSAGE_KIND_SPECS
            .iter()
            .find(|spec| spec.kind == self)
            .expect("message kind spec must exist for every kind")
    }

    pub fn as_str(self) -> &'static str {
        self.spec().wire
    }

    pub fn direction(self) -> Direction {
        self.spec().direction
    }

    pub fn is_terminal(self) -> bool {
        self.spec().terminal
    }
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
