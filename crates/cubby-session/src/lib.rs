//! Cubby Session Library
//!
//! This crate provides the identity session layer: the `AuthBackend` trait
//! wrapping the external identity provider, and `Session`, which publishes the
//! current identity (or none) plus a `resolving` flag to subscribers and
//! notifies them exactly once per sign-in and sign-out.

pub mod backend;
pub mod dev;
pub mod session;

// Re-export commonly used types
pub use backend::{AuthBackend, AuthError, AuthResult};
pub use dev::DevAuthBackend;
pub use session::{Session, SessionState};
