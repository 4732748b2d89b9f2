//! Session state and change notification.
//!
//! `Session` is the single owner of the published identity state. Downstream
//! components treat an identity change as a reset signal; they subscribe here
//! and never call the auth backend themselves.

use crate::backend::{AuthBackend, AuthResult};
use cubby_core::Identity;
use std::sync::Arc;
use tokio::sync::watch;

/// Published session state.
///
/// `resolving` is true from construction until startup session restoration has
/// answered; `identity` is `None` when signed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub resolving: bool,
    pub identity: Option<Identity>,
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }
}

/// Identity session provider.
///
/// Wraps an [`AuthBackend`] and publishes [`SessionState`] over a watch
/// channel. Each sign-in and each sign-out produces exactly one change
/// notification; publishing an unchanged state notifies nobody.
pub struct Session {
    backend: Arc<dyn AuthBackend>,
    tx: watch::Sender<SessionState>,
}

impl Session {
    /// Create a session in the `resolving` state. Call [`Session::restore`]
    /// to complete startup restoration.
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (tx, _) = watch::channel(SessionState {
            resolving: true,
            identity: None,
        });
        Session { backend, tx }
    }

    /// Restore a persisted session from the backend and leave the
    /// `resolving` state.
    ///
    /// A restoration failure is surfaced to the caller but still leaves
    /// `resolving`; an unusable persisted session must not wedge startup.
    pub async fn restore(&self) -> AuthResult<Option<Identity>> {
        let restored = self.backend.restore().await;

        let identity = match &restored {
            Ok(identity) => identity.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "Session restoration failed");
                None
            }
        };

        self.publish(identity.clone());
        restored?;
        Ok(identity)
    }

    /// Sign in against the backend and publish the new identity.
    pub async fn sign_in(&self) -> AuthResult<Identity> {
        let identity = self.backend.sign_in().await?;

        tracing::info!(email = %identity.email, "Signed in");
        self.publish(Some(identity.clone()));

        Ok(identity)
    }

    /// Sign out against the backend and publish the signed-out state.
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.backend.sign_out().await?;

        tracing::info!("Signed out");
        self.publish(None);

        Ok(())
    }

    /// Subscribe to session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Current session state snapshot.
    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Current identity, if signed in.
    pub fn identity(&self) -> Option<Identity> {
        self.tx.borrow().identity.clone()
    }

    fn publish(&self, identity: Option<Identity>) {
        let next = SessionState {
            resolving: false,
            identity,
        };
        self.tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next.clone();
                true
            }
        });
    }
}
