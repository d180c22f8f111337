use crate::surface::{ChildViewSpec, HostSurface, ListenerId, OverlayError, StyleHandle};
use envpick_protocol::{ChildViewId, InboundEvent};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

pub const OVERLAY_FRAME_CLASS: &str = "envpick-welcome-frame";

pub const OVERLAY_CSS: &str = "
.envpick-welcome-frame {
  background-color: #fff;
  border: none;
  position: fixed;
  top: 0;
  left: 0;
  height: 100%;
  width: 100%;
  z-index: 10000;
}
";

/// Style, child view, and listener created for one picker interaction.
///
/// Each piece is optional so [`Overlay::release`] can run any number of times.
#[derive(Debug, Default)]
pub struct Overlay {
    style: Option<StyleHandle>,
    view: Option<ChildViewId>,
    listener: Option<ListenerId>,
}

impl Overlay {
    /// Create the style, then the child view, then the listener.
    ///
    /// On failure the pieces already created are removed before the error is
    /// returned, so the caller never holds a half-built overlay.
    pub fn acquire<S>(
        surface: &S,
        url: &str,
        title: &str,
    ) -> Result<(Self, UnboundedReceiver<InboundEvent>), OverlayError>
    where
        S: HostSurface + ?Sized,
    {
        let mut overlay = Self {
            style: Some(surface.add_style(OVERLAY_CSS)?),
            ..Self::default()
        };

        let spec = ChildViewSpec {
            url: url.to_string(),
            class_name: OVERLAY_FRAME_CLASS.to_string(),
            title: title.to_string(),
        };
        match surface.add_child_view(&spec) {
            Ok(view) => overlay.view = Some(view),
            Err(err) => {
                overlay.release(surface);
                return Err(err);
            }
        }

        let listener = match surface.add_message_listener() {
            Ok(listener) => listener,
            Err(err) => {
                overlay.release(surface);
                return Err(err);
            }
        };
        overlay.listener = Some(listener.id);

        debug!(view = ?overlay.view, url, "overlay acquired");
        Ok((overlay, listener.events))
    }

    pub fn view(&self) -> Option<ChildViewId> {
        self.view
    }

    pub fn is_released(&self) -> bool {
        self.style.is_none() && self.view.is_none() && self.listener.is_none()
    }

    /// Detach the listener, remove the child view, remove the style.
    pub fn release<S>(&mut self, surface: &S)
    where
        S: HostSurface + ?Sized,
    {
        if self.is_released() {
            return;
        }
        if let Some(listener) = self.listener.take() {
            surface.remove_message_listener(listener);
        }
        if let Some(view) = self.view.take() {
            surface.remove_child_view(view);
        }
        if let Some(style) = self.style.take() {
            surface.remove_style(style);
        }
        debug!("overlay released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySurface, SurfaceOp};

    const URL: &str = "https://welcome.example.com/omnibar/welcome?hosted=1";

    #[test]
    fn acquire_creates_style_view_listener_in_order() {
        let surface = MemorySurface::new();
        let (overlay, _events) =
            Overlay::acquire(&surface, URL, "Welcome").expect("overlay should acquire");

        let journal = surface.journal();
        assert!(matches!(journal[0], SurfaceOp::StyleAdded(_)));
        assert!(matches!(journal[1], SurfaceOp::ChildViewAdded(_)));
        assert!(matches!(journal[2], SurfaceOp::ListenerAdded(_)));

        let views = surface.child_views();
        assert_eq!(views.len(), 1);
        assert_eq!(Some(views[0].0), overlay.view());
        assert_eq!(views[0].1.class_name, OVERLAY_FRAME_CLASS);
        assert_eq!(views[0].1.title, "Welcome");
        assert_eq!(views[0].1.url, URL);
    }

    #[test]
    fn release_is_idempotent() {
        let surface = MemorySurface::new();
        let (mut overlay, _events) =
            Overlay::acquire(&surface, URL, "Welcome").expect("overlay should acquire");

        overlay.release(&surface);
        assert!(overlay.is_released());
        assert!(surface.is_idle());
        let after_first = surface.journal().len();

        overlay.release(&surface);
        assert_eq!(surface.journal().len(), after_first);
    }

    #[test]
    fn release_tolerates_pieces_removed_elsewhere() {
        let surface = MemorySurface::new();
        let (mut overlay, _events) =
            Overlay::acquire(&surface, URL, "Welcome").expect("overlay should acquire");
        let view = overlay.view().expect("view should exist");
        surface.remove_child_view_externally(view);

        overlay.release(&surface);
        assert!(overlay.is_released());
        assert!(surface.is_idle());
    }

    #[test]
    fn failed_child_view_removes_style() {
        let surface = MemorySurface::new();
        surface.fail_child_views(true);

        let err = Overlay::acquire(&surface, URL, "Welcome").expect_err("child view should fail");
        assert!(matches!(err, OverlayError::ChildView(_)));
        assert!(surface.is_idle());
        assert!(matches!(
            surface.journal().last(),
            Some(SurfaceOp::StyleRemoved(_))
        ));
    }

    #[tokio::test]
    async fn released_listener_stops_receiving() {
        let surface = MemorySurface::new();
        let (mut overlay, mut events) =
            Overlay::acquire(&surface, URL, "Welcome").expect("overlay should acquire");
        let view = overlay.view().expect("view should exist");

        assert_eq!(
            surface.deliver_from_view(view, serde_json::json!({ "messageType": "ready" })),
            1
        );
        overlay.release(&surface);
        assert_eq!(
            surface.deliver_from_view(view, serde_json::json!({ "messageType": "ready" })),
            0
        );

        assert!(events.recv().await.is_some());
        assert!(events.recv().await.is_none());
    }
}
