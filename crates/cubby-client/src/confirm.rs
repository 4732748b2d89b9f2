//! Delete confirmation gate.
//!
//! Destructive actions await a user decision before the backend call is
//! issued. In a UI this is a blocking prompt; here it is a suspension point
//! behind a trait so headless callers and tests can inject a policy.

use async_trait::async_trait;

#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    /// Present `message` and return whether the user confirmed.
    async fn confirm(&self, message: &str) -> bool;
}

/// Confirms every prompt. For headless use where the caller has already
/// gathered consent.
pub struct AlwaysConfirm;

#[async_trait]
impl ConfirmPrompt for AlwaysConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Declines every prompt.
pub struct NeverConfirm;

#[async_trait]
impl ConfirmPrompt for NeverConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        false
    }
}
