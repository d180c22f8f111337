use async_trait::async_trait;
use envpick_context::{EnvironmentLookup, LookupError};
use envpick_protocol::NavigationResult;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serves a navigation result from a JSON file, ignoring url and token.
#[derive(Debug, Clone)]
pub struct FileLookup {
    path: PathBuf,
}

impl FileLookup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EnvironmentLookup for FileLookup {
    async fn request_with_token(
        &self,
        url: &str,
        _token: &str,
    ) -> Result<NavigationResult, LookupError> {
        debug!(url, path = %self.path.display(), "serving lookup from file");
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|err| LookupError::Transport {
                url: self.path.display().to_string(),
                reason: err.to_string(),
            })?;
        serde_json::from_slice(&raw).map_err(|err| {
            LookupError::Decode(format!("{}: {err}", self.path.display()))
        })
    }
}
