use crate::collaborators::{EnvironmentLookup, ErrorNavigator, TokenOptions, TokenProvider};
use crate::config::NegotiationConfig;
use crate::error::{ContextError, TokenErrorCode};
use crate::picker::PickerSession;
use crate::request::ContextRequest;
use envpick_overlay::HostSurface;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Entry point: makes sure a request carries an environment when it needs one.
///
/// Each call negotiates on its own. Concurrent calls get independent overlays
/// and listeners; an event from one call's child view never satisfies another.
#[derive(Clone)]
pub struct ContextResolver {
    config: Arc<NegotiationConfig>,
    tokens: Arc<dyn TokenProvider>,
    lookup: Arc<dyn EnvironmentLookup>,
    navigator: Arc<dyn ErrorNavigator>,
    surface: Arc<dyn HostSurface>,
}

impl ContextResolver {
    pub fn new(
        config: NegotiationConfig,
        tokens: Arc<dyn TokenProvider>,
        lookup: Arc<dyn EnvironmentLookup>,
        navigator: Arc<dyn ErrorNavigator>,
        surface: Arc<dyn HostSurface>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tokens,
            lookup,
            navigator,
            surface,
        }
    }

    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Resolve the request's environment.
    ///
    /// - already satisfied: returns the request untouched, no I/O;
    /// - one candidate: selects it;
    /// - several: runs the picker and returns its outcome;
    /// - no service id or no candidates: redirects to the error page and
    ///   never completes.
    ///
    /// Token and lookup failures are returned as errors.
    #[instrument(
        skip_all,
        fields(service_id = request.service_id().unwrap_or_default())
    )]
    pub async fn ensure_context(
        &self,
        mut request: ContextRequest,
    ) -> Result<ContextRequest, ContextError> {
        if request.is_satisfied() {
            debug!("context already satisfied");
            return Ok(request);
        }

        let Some(service_id) = request.service_id().map(str::to_string) else {
            // Without a service id the lookup cannot return environments.
            return self.abandon_to_error_page().await;
        };

        let token = self.tokens.get_token(TokenOptions::default()).await?;
        let url = self.config.lookup_url_for(&service_id);
        let navigation = self.lookup.request_with_token(&url, &token).await?;
        debug!(candidates = navigation.len(), "environment lookup finished");

        if let Some(only) = navigation.single() {
            info!(environment_id = %only.id, "selected the only environment");
            request.environment_id = Some(only.id.clone());
            return Ok(request);
        }
        if navigation.is_empty() {
            return self.abandon_to_error_page().await;
        }

        PickerSession::new(
            Arc::clone(&self.config),
            Arc::clone(&self.surface),
            Arc::clone(&self.tokens),
        )
        .run(request, navigation)
        .await
    }

    /// Hand off to the error page; the caller is navigating away.
    async fn abandon_to_error_page(&self) -> Result<ContextRequest, ContextError> {
        info!("no usable environment; redirecting to error page");
        self.navigator
            .redirect_to_error(TokenErrorCode::InvalidEnvironment);
        std::future::pending().await
    }
}
