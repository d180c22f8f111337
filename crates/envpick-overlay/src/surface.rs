use envpick_protocol::{ChildViewId, InboundEvent, MessagePort};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StyleHandle(u64);

impl StyleHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// What the host needs to create an embedded child view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildViewSpec {
    pub url: String,
    pub class_name: String,
    pub title: String,
}

/// A registered cross-context listener and the events it receives.
#[derive(Debug)]
pub struct MessageListener {
    pub id: ListenerId,
    pub events: UnboundedReceiver<InboundEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("failed to add overlay style: {0}")]
    Style(String),
    #[error("failed to add child view: {0}")]
    ChildView(String),
    #[error("failed to add message listener: {0}")]
    Listener(String),
}

/// Platform primitives the overlay is built from.
///
/// Removal methods must tolerate handles that are already gone.
pub trait HostSurface: MessagePort + Send + Sync {
    fn add_style(&self, css: &str) -> Result<StyleHandle, OverlayError>;
    fn remove_style(&self, style: StyleHandle);
    fn add_child_view(&self, spec: &ChildViewSpec) -> Result<ChildViewId, OverlayError>;
    fn remove_child_view(&self, view: ChildViewId);
    fn add_message_listener(&self) -> Result<MessageListener, OverlayError>;
    fn remove_message_listener(&self, listener: ListenerId);
}
