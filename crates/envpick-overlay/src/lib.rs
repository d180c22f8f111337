//! Overlay lifecycle.
//!
//! The overlay is the stylesheet, embedded child view, and message listener
//! the host creates while the picker is on screen. This crate defines the
//! platform seam ([`HostSurface`]) and treats the three pieces as one scoped
//! resource ([`Overlay`]). [`MemorySurface`] is an in-process host used by the
//! command-line simulator and by tests.

pub mod memory;
pub mod overlay;
pub mod surface;

pub use memory::{MemorySurface, PostedMessage, SurfaceOp};
pub use overlay::{OVERLAY_CSS, OVERLAY_FRAME_CLASS, Overlay};
pub use surface::{
    ChildViewSpec, HostSurface, ListenerId, MessageListener, OverlayError, StyleHandle,
};
