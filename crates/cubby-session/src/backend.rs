//! Auth backend abstraction trait
//!
//! Wraps the external identity provider. `Session` drives this trait; nothing
//! else in the workspace talks to the provider directly.

use async_trait::async_trait;
use cubby_core::Identity;
use thiserror::Error;

/// Identity provider errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Sign-in failed: {0}")]
    SignInFailed(String),

    #[error("Sign-out failed: {0}")]
    SignOutFailed(String),

    #[error("Session restoration failed: {0}")]
    RestoreFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Session file error: {0}")]
    SessionFile(#[from] serde_json::Error),
}

/// Result type for identity provider operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Identity provider abstraction
///
/// Implemented by the external provider's adapter in production and by
/// [`crate::DevAuthBackend`] for local development; tests substitute mocks.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Interactive sign-in against the provider.
    async fn sign_in(&self) -> AuthResult<Identity>;

    /// End the provider session.
    async fn sign_out(&self) -> AuthResult<()>;

    /// Restore a persisted session, if the provider has one.
    async fn restore(&self) -> AuthResult<Option<Identity>>;
}
