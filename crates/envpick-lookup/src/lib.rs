//! Concrete collaborators for `envpick-context`.
//!
//! - [`HttpEnvironmentLookup`]: authenticated GET against the navigation service
//! - [`FileLookup`]: a navigation result stored on disk, for offline runs
//! - [`StaticTokenProvider`]: a token supplied up front

pub mod file;
pub mod http;
pub mod token;

pub use file::FileLookup;
pub use http::HttpEnvironmentLookup;
pub use token::StaticTokenProvider;
