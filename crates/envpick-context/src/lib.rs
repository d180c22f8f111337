//! # envpick-context
//!
//! Resolves which environment an authenticated caller operates against.
//!
//! ```text
//! ContextResolver::ensure_context
//!     │  satisfied ───────────────▶ Ok(request)
//!     │  token + lookup
//!     ├─ 1 candidate ─────────────▶ Ok(request + environment_id)
//!     ├─ n candidates ─▶ PickerSession::run ─▶ Ok(..) | Err(Rejected{canceled})
//!     └─ 0 / no service id ───────▶ ErrorNavigator::redirect_to_error, never completes
//! ```
//!
//! Token acquisition, the lookup transport, navigation, and the host platform
//! are collaborators supplied by the embedding application.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod picker;
pub mod request;
pub mod resolver;

pub use collaborators::{EnvironmentLookup, ErrorNavigator, TokenOptions, TokenProvider};
pub use config::{ConfigError, NegotiationConfig};
pub use error::{
    ContextError, LookupError, REASON_CANCELED, Rejection, TokenError, TokenErrorCode,
};
pub use picker::{PickerSession, PickerState};
pub use request::ContextRequest;
pub use resolver::ContextResolver;

pub use envpick_protocol::{EnvironmentCandidate, NavigationResult};
