use async_trait::async_trait;
use envpick_context::{TokenError, TokenErrorCode, TokenOptions, TokenProvider};

/// Hands out a fixed token. Without one every request fails as not logged in.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()).filter(|t: &String| !t.trim().is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self, _options: TokenOptions) -> Result<String, TokenError> {
        self.token
            .clone()
            .ok_or_else(|| TokenError::new(TokenErrorCode::NotLoggedIn, "no token configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_token() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(
            provider
                .get_token(TokenOptions::default())
                .await
                .expect("token should be returned"),
            "abc"
        );
    }

    #[tokio::test]
    async fn blank_or_missing_token_is_not_logged_in() {
        for provider in [StaticTokenProvider::new("  "), StaticTokenProvider::anonymous()] {
            let err = provider
                .get_token(TokenOptions {
                    disable_redirect: true,
                })
                .await
                .expect_err("no token should fail");
            assert_eq!(err.code, TokenErrorCode::NotLoggedIn);
        }
    }
}
