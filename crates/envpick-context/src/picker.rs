//! Interactive environment selection through the embedded picker surface.
//!
//! ```text
//! Idle ──start──▶ Showing ──ready──▶ Exchanging ──┬─ welcome-environment-selected ─▶ Resolved
//!                    │                    ▲  │    └─ welcome-cancel ──────────────▶ Canceled
//!                    └──── get-token ─────┘  └─ get-token (reply, stay)
//! ```
//!
//! A session owns its overlay from `start` until `stop`. Dropping a session
//! stops it, so an abandoned negotiation never leaves the overlay behind.

use crate::collaborators::{TokenOptions, TokenProvider};
use crate::config::NegotiationConfig;
use crate::error::{ContextError, Rejection};
use crate::request::ContextRequest;
use envpick_overlay::{HostSurface, Overlay, OverlayError};
use envpick_protocol::{
    CorrelationId, InboundEvent, NavigationResult, ProtocolMessage, SurfaceBinding,
    decode_inbound, is_from_embedded_surface, send,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Idle,
    Showing,
    Exchanging,
    Resolved,
    Canceled,
}

impl PickerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Canceled)
    }
}

/// What one inbound message did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Continue,
    Canceled,
    Selected(String),
}

pub struct PickerSession {
    config: Arc<NegotiationConfig>,
    surface: Arc<dyn HostSurface>,
    tokens: Arc<dyn TokenProvider>,
    state: PickerState,
    overlay: Overlay,
    binding: Option<SurfaceBinding>,
    events: Option<UnboundedReceiver<InboundEvent>>,
}

impl PickerSession {
    pub fn new(
        config: Arc<NegotiationConfig>,
        surface: Arc<dyn HostSurface>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            config,
            surface,
            tokens,
            state: PickerState::Idle,
            overlay: Overlay::default(),
            binding: None,
            events: None,
        }
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    /// Show the overlay and start listening. No-op unless the session is idle.
    pub fn start(&mut self, request: &ContextRequest) -> Result<(), ContextError> {
        if self.state != PickerState::Idle {
            return Ok(());
        }

        let url = self.config.picker_url_for(request);
        let (overlay, events) =
            Overlay::acquire(self.surface.as_ref(), &url, &self.config.frame_title)?;
        self.overlay = overlay;
        self.events = Some(events);

        let binding = self
            .overlay
            .view()
            .ok_or_else(|| {
                ContextError::from(OverlayError::ChildView(
                    "overlay has no child view".to_string(),
                ))
            })
            .and_then(|view| SurfaceBinding::new(view, &url).map_err(ContextError::from));
        match binding {
            Ok(binding) => {
                info!(view = %binding.view(), origin = binding.origin(), "picker showing");
                self.binding = Some(binding);
                self.state = PickerState::Showing;
                Ok(())
            }
            Err(err) => {
                self.stop();
                Err(err)
            }
        }
    }

    /// Release the overlay and stop listening. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.overlay.release(self.surface.as_ref());
        self.binding = None;
        self.events = None;
    }

    /// Drive the session until the surface selects an environment or cancels.
    ///
    /// Resolves with `environment_id` set, or rejects with `canceled`. Stays
    /// pending if the surface never sends a terminal message.
    pub async fn run(
        mut self,
        mut request: ContextRequest,
        navigation: NavigationResult,
    ) -> Result<ContextRequest, ContextError> {
        self.start(&request)?;

        loop {
            let Some(event) = self.next_event().await else {
                warn!("picker listener closed before a terminal message");
                return std::future::pending().await;
            };

            match self.handle_event(event, &navigation).await {
                Step::Continue => {}
                Step::Canceled => {
                    self.stop();
                    self.state = PickerState::Canceled;
                    info!("picker canceled");
                    return Err(ContextError::Rejected(Rejection::canceled()));
                }
                Step::Selected(environment_id) => {
                    self.stop();
                    // The overlay must be gone before the caller moves on.
                    tokio::time::sleep(self.config.settle_delay()).await;
                    info!(environment_id = %environment_id, "picker resolved");
                    request.environment_id = Some(environment_id);
                    self.state = PickerState::Resolved;
                    return Ok(request);
                }
            }
        }
    }

    async fn next_event(&mut self) -> Option<InboundEvent> {
        match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => None,
        }
    }

    async fn handle_event(&mut self, event: InboundEvent, navigation: &NavigationResult) -> Step {
        let Some(binding) = self.binding.as_ref() else {
            return Step::Continue;
        };
        if !is_from_embedded_surface(&event, binding) {
            debug!(
                origin = %event.origin,
                source = ?event.source,
                "ignoring message from outside the picker surface"
            );
            return Step::Continue;
        }

        let message = match decode_inbound(&event.data) {
            Ok(message) => message,
            Err(err) => {
                debug!(error = %err, "ignoring picker message");
                return Step::Continue;
            }
        };

        match message {
            ProtocolMessage::Ready => {
                self.post(&ProtocolMessage::HostReady);
                self.post(&ProtocolMessage::ContextProvide {
                    context_navigation: navigation.clone(),
                });
                self.state = PickerState::Exchanging;
                Step::Continue
            }
            ProtocolMessage::GetToken {
                token_request_id,
                disable_redirect,
            } => {
                let reply =
                    token_reply(self.tokens.as_ref(), token_request_id, disable_redirect).await;
                self.post(&reply);
                Step::Continue
            }
            ProtocolMessage::WelcomeCancel => Step::Canceled,
            ProtocolMessage::WelcomeEnvironmentSelected { env_id } => {
                if env_id.trim().is_empty() {
                    debug!("ignoring selection without an environment id");
                    return Step::Continue;
                }
                Step::Selected(env_id)
            }
            // Outbound kinds never decode as inbound.
            ProtocolMessage::HostReady
            | ProtocolMessage::ContextProvide { .. }
            | ProtocolMessage::Token { .. }
            | ProtocolMessage::TokenFail { .. } => Step::Continue,
        }
    }

    fn post(&self, message: &ProtocolMessage) {
        let Some(binding) = self.binding.as_ref() else {
            return;
        };
        if let Err(err) = send(self.surface.as_ref(), binding, message) {
            warn!(kind = %message.kind(), error = %err, "failed to post picker message");
        }
    }
}

/// Answer one `get-token` request with `token` or `token-fail`.
async fn token_reply(
    tokens: &dyn TokenProvider,
    token_request_id: CorrelationId,
    disable_redirect: bool,
) -> ProtocolMessage {
    match tokens.get_token(TokenOptions { disable_redirect }).await {
        Ok(token) => ProtocolMessage::Token {
            token,
            token_request_id,
        },
        Err(err) => {
            debug!(request = %token_request_id, error = %err, "token relay failed");
            ProtocolMessage::TokenFail {
                reason: err.to_failure(),
                token_request_id,
            }
        }
    }
}

impl Drop for PickerSession {
    fn drop(&mut self) {
        self.stop();
    }
}
