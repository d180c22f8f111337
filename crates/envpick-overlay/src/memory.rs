use crate::surface::{
    ChildViewSpec, HostSurface, ListenerId, MessageListener, OverlayError, StyleHandle,
};
use envpick_protocol::{ChildViewId, InboundEvent, MessagePort, ProtocolError, origin_of};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

/// One platform operation, in the order the host performed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    StyleAdded(StyleHandle),
    StyleRemoved(StyleHandle),
    ChildViewAdded(ChildViewId),
    ChildViewRemoved(ChildViewId),
    ListenerAdded(ListenerId),
    ListenerRemoved(ListenerId),
    Posted { target: ChildViewId, kind: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedMessage {
    pub target: ChildViewId,
    pub target_origin: String,
    pub payload: Value,
}

impl PostedMessage {
    pub fn kind(&self) -> &str {
        self.payload
            .get("messageType")
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    next_id: u64,
    styles: BTreeMap<StyleHandle, String>,
    views: BTreeMap<ChildViewId, ChildViewSpec>,
    listeners: BTreeMap<ListenerId, UnboundedSender<InboundEvent>>,
    posted: Vec<PostedMessage>,
    journal: Vec<SurfaceOp>,
    fail_child_views: bool,
}

impl SurfaceState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn is_idle(&self) -> bool {
        self.styles.is_empty() && self.views.is_empty() && self.listeners.is_empty()
    }
}

/// In-process host: records every platform call and broadcasts delivered
/// events to every registered listener, as a window message event would.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: Mutex<SurfaceState>,
    changed: Notify,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut SurfaceState) -> T) -> T {
        let out = f(&mut *self.lock());
        self.changed.notify_waiters();
        out
    }

    /// Make every subsequent `add_child_view` fail.
    pub fn fail_child_views(&self, fail: bool) {
        self.mutate(|state| state.fail_child_views = fail);
    }

    /// Broadcast an event to every listener; returns how many received it.
    pub fn deliver(&self, event: InboundEvent) -> usize {
        let senders: Vec<UnboundedSender<InboundEvent>> =
            self.lock().listeners.values().cloned().collect();
        senders
            .iter()
            .filter(|sender| sender.send(event.clone()).is_ok())
            .count()
    }

    /// Deliver `data` as if posted by `view` from the origin it was loaded at.
    ///
    /// Views that no longer exist cannot post; nothing is delivered.
    pub fn deliver_from_view(&self, view: ChildViewId, data: Value) -> usize {
        let url = match self.lock().views.get(&view) {
            Some(spec) => spec.url.clone(),
            None => return 0,
        };
        let Ok(origin) = origin_of(&url) else {
            return 0;
        };
        self.deliver(InboundEvent {
            origin,
            source: Some(view),
            data,
        })
    }

    /// Remove a child view behind the overlay's back.
    pub fn remove_child_view_externally(&self, view: ChildViewId) {
        self.mutate(|state| {
            state.views.remove(&view);
        });
    }

    pub fn child_views(&self) -> Vec<(ChildViewId, ChildViewSpec)> {
        self.lock()
            .views
            .iter()
            .map(|(id, spec)| (*id, spec.clone()))
            .collect()
    }

    pub fn active_styles(&self) -> usize {
        self.lock().styles.len()
    }

    pub fn active_listeners(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn is_idle(&self) -> bool {
        self.lock().is_idle()
    }

    pub fn posted(&self) -> Vec<PostedMessage> {
        self.lock().posted.clone()
    }

    pub fn journal(&self) -> Vec<SurfaceOp> {
        self.lock().journal.clone()
    }

    async fn wait_until<T>(&self, mut probe: impl FnMut(&SurfaceState) -> Option<T>) -> T {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            let ready = probe(&*self.lock());
            if let Some(value) = ready {
                return value;
            }
            notified.await;
        }
    }

    /// Wait until a child view exists and return the newest one.
    pub async fn wait_for_child_view(&self) -> ChildViewId {
        self.wait_until(|state| state.views.keys().next_back().copied())
            .await
    }

    /// Wait until at least `count` messages were posted.
    pub async fn wait_for_posted(&self, count: usize) -> Vec<PostedMessage> {
        self.wait_until(|state| (state.posted.len() >= count).then(|| state.posted.clone()))
            .await
    }

    /// Wait until no style, child view, or listener remains.
    pub async fn wait_until_idle(&self) {
        self.wait_until(|state| state.is_idle().then_some(())).await
    }
}

impl MessagePort for MemorySurface {
    fn post_message(
        &self,
        target: ChildViewId,
        target_origin: &str,
        payload: Value,
    ) -> Result<(), ProtocolError> {
        self.mutate(|state| {
            if !state.views.contains_key(&target) {
                return Err(ProtocolError::PortClosed(target.get()));
            }
            let message = PostedMessage {
                target,
                target_origin: target_origin.to_string(),
                payload,
            };
            state.journal.push(SurfaceOp::Posted {
                target,
                kind: message.kind().to_string(),
            });
            state.posted.push(message);
            Ok(())
        })
    }
}

impl HostSurface for MemorySurface {
    fn add_style(&self, css: &str) -> Result<StyleHandle, OverlayError> {
        Ok(self.mutate(|state| {
            let handle = StyleHandle::new(state.next_id());
            state.styles.insert(handle, css.to_string());
            state.journal.push(SurfaceOp::StyleAdded(handle));
            handle
        }))
    }

    fn remove_style(&self, style: StyleHandle) {
        self.mutate(|state| {
            if state.styles.remove(&style).is_some() {
                state.journal.push(SurfaceOp::StyleRemoved(style));
            }
        });
    }

    fn add_child_view(&self, spec: &ChildViewSpec) -> Result<ChildViewId, OverlayError> {
        self.mutate(|state| {
            if state.fail_child_views {
                return Err(OverlayError::ChildView(format!(
                    "host refused child view for {}",
                    spec.url
                )));
            }
            let view = ChildViewId::new(state.next_id());
            state.views.insert(view, spec.clone());
            state.journal.push(SurfaceOp::ChildViewAdded(view));
            Ok(view)
        })
    }

    fn remove_child_view(&self, view: ChildViewId) {
        self.mutate(|state| {
            if state.views.remove(&view).is_some() {
                state.journal.push(SurfaceOp::ChildViewRemoved(view));
            }
        });
    }

    fn add_message_listener(&self) -> Result<MessageListener, OverlayError> {
        Ok(self.mutate(|state| {
            let id = ListenerId::new(state.next_id());
            let (sender, events) = unbounded_channel();
            state.listeners.insert(id, sender);
            state.journal.push(SurfaceOp::ListenerAdded(id));
            MessageListener { id, events }
        }))
    }

    fn remove_message_listener(&self, listener: ListenerId) {
        self.mutate(|state| {
            if state.listeners.remove(&listener).is_some() {
                state.journal.push(SurfaceOp::ListenerRemoved(listener));
            }
        });
    }
}
