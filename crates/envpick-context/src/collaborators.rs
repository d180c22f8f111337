//! Services the negotiation consumes but does not own.

use crate::error::{LookupError, TokenError, TokenErrorCode};
use async_trait::async_trait;
use envpick_protocol::NavigationResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenOptions {
    /// Fail instead of navigating to a login page.
    pub disable_redirect: bool,
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self, options: TokenOptions) -> Result<String, TokenError>;
}

/// Authenticated environment lookup; one attempt, no retry.
#[async_trait]
pub trait EnvironmentLookup: Send + Sync {
    async fn request_with_token(
        &self,
        url: &str,
        token: &str,
    ) -> Result<NavigationResult, LookupError>;
}

/// Terminal navigation to the error flow. Nothing is awaited afterwards.
pub trait ErrorNavigator: Send + Sync {
    fn redirect_to_error(&self, code: TokenErrorCode);
}
