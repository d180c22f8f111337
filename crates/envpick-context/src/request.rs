use serde::{Deserialize, Serialize};

/// What the caller needs resolved.
///
/// Only `environment_id` is ever written by negotiation. Blank strings count
/// as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextRequest {
    #[serde(default, alias = "svcId", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, alias = "envId", skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    #[serde(default, alias = "envIdRequired")]
    pub environment_required: bool,
    /// Caller context URL handed to the picker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ContextRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    pub fn with_environment_id(mut self, environment_id: impl Into<String>) -> Self {
        self.environment_id = Some(environment_id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.environment_required = required;
        self
    }

    pub fn service_id(&self) -> Option<&str> {
        non_blank(self.service_id.as_deref())
    }

    pub fn environment_id(&self) -> Option<&str> {
        non_blank(self.environment_id.as_deref())
    }

    /// Nothing to negotiate: an environment is known or none is needed.
    pub fn is_satisfied(&self) -> bool {
        self.environment_id().is_some() || !self.environment_required
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
