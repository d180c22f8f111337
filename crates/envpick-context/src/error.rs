//! Error types for context negotiation.

use envpick_overlay::OverlayError;
use envpick_protocol::{ProtocolError, TokenFailure};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const REASON_CANCELED: &str = "canceled";

/// Error codes shared with the token service and the error page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    NotLoggedIn,
    InvalidEnvironment,
    Offline,
    PermissionScopeNotAllowed,
}

impl TokenErrorCode {
    pub fn code(self) -> u16 {
        match self {
            Self::NotLoggedIn => 1,
            Self::InvalidEnvironment => 2,
            Self::Offline => 3,
            Self::PermissionScopeNotAllowed => 4,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::NotLoggedIn),
            2 => Some(Self::InvalidEnvironment),
            3 => Some(Self::Offline),
            4 => Some(Self::PermissionScopeNotAllowed),
            _ => None,
        }
    }
}

impl Display for TokenErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::NotLoggedIn => "not_logged_in",
            Self::InvalidEnvironment => "invalid_environment",
            Self::Offline => "offline",
            Self::PermissionScopeNotAllowed => "permission_scope_not_allowed",
        };
        f.write_str(label)
    }
}

/// Failure reported by the token-acquisition collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token unavailable ({code}): {message}")]
pub struct TokenError {
    pub code: TokenErrorCode,
    pub message: String,
}

impl TokenError {
    pub fn new(code: TokenErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Wire form used in `token-fail` replies.
    pub fn to_failure(&self) -> TokenFailure {
        TokenFailure {
            code: self.code.code(),
            message: self.message.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("lookup request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("lookup response could not be decoded: {0}")]
    Decode(String),
}

/// Clean rejection shape callers branch on; today only `canceled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
}

impl Rejection {
    pub fn canceled() -> Self {
        Self {
            reason: REASON_CANCELED.to_string(),
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.reason == REASON_CANCELED
    }
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("context negotiation rejected: {}", .0.reason)]
    Rejected(Rejection),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ContextError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.rejection().is_some_and(Rejection::is_canceled)
    }
}
