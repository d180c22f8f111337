use crate::error::TokenErrorCode;
use crate::request::ContextRequest;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PICKER_URL: &str = "https://welcome.example.com/omnibar/welcome";
pub const DEFAULT_LOOKUP_URL: &str = "https://navigation.example.com/user/services";
pub const DEFAULT_ERROR_URL: &str = "https://welcome.example.com/errors/security";
pub const DEFAULT_FRAME_TITLE: &str = "Welcome";
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 10;
const ERROR_SOURCE: &str = "envpick";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Endpoints and timing for one negotiation host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NegotiationConfig {
    /// Base URL of the hosted picker.
    pub picker_url: String,
    /// Base URL of the environment lookup service.
    pub lookup_url: String,
    /// Error page used when the caller has no usable environment.
    pub error_url: String,
    pub frame_title: String,
    /// Pause between removing the overlay and completing the negotiation.
    pub settle_delay_ms: u64,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            picker_url: DEFAULT_PICKER_URL.to_string(),
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            error_url: DEFAULT_ERROR_URL.to_string(),
            frame_title: DEFAULT_FRAME_TITLE.to_string(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl NegotiationConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("picker_url", &self.picker_url)?;
        validate_http_url("lookup_url", &self.lookup_url)?;
        validate_http_url("error_url", &self.error_url)?;
        if self.settle_delay_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "settle_delay_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms.max(1))
    }

    /// Negotiation URL the picker child view is loaded from.
    pub fn picker_url_for(&self, request: &ContextRequest) -> String {
        append_query(
            &self.picker_url,
            &[
                ("hosted", "1"),
                ("svcid", request.service_id().unwrap_or_default()),
                ("url", request.url.as_deref().unwrap_or_default()),
            ],
        )
    }

    pub fn lookup_url_for(&self, service_id: &str) -> String {
        append_query(&self.lookup_url, &[("svcid", service_id)])
    }

    pub fn error_url_for(&self, code: TokenErrorCode, return_url: Option<&str>) -> String {
        let code = code.code().to_string();
        append_query(
            &self.error_url,
            &[
                ("source", ERROR_SOURCE),
                ("code", code.as_str()),
                ("url", return_url.unwrap_or_default()),
            ],
        )
    }
}

fn validate_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|e| ConfigError::Invalid {
        field,
        reason: format!("`{value}` is not a URL: {e}"),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            field,
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

/// Append percent-encoded query pairs to `base`.
fn append_query(base: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = base.to_string();
    let mut separator = if base.contains('?') { '&' } else { '?' };
    for (key, value) in pairs {
        out.push(separator);
        out.push_str(key);
        out.push('=');
        out.push_str(&urlencoding::encode(value));
        separator = '&';
    }
    out
}
