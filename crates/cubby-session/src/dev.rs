//! Local development auth backend.
//!
//! Serves a configured identity and persists the session to a JSON file so it
//! survives restarts, the way the real provider persists its own session. The
//! production identity provider is an external service wrapped by its own
//! [`crate::AuthBackend`] adapter in the embedding application.

use crate::backend::{AuthBackend, AuthError, AuthResult};
use async_trait::async_trait;
use cubby_core::{Config, ConfigError, Identity};
use std::path::PathBuf;
use tokio::fs;

pub struct DevAuthBackend {
    identity: Identity,
    session_file: Option<PathBuf>,
}

impl DevAuthBackend {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            session_file: None,
        }
    }

    /// Persist the signed-in identity to `path` so `restore` finds it on the
    /// next run.
    pub fn with_session_file(identity: Identity, path: impl Into<PathBuf>) -> Self {
        Self {
            identity,
            session_file: Some(path.into()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let email = config
            .dev_identity_email
            .clone()
            .ok_or(ConfigError::MissingVar("DEV_IDENTITY_EMAIL"))?;

        let identity = match config.dev_identity_name.clone() {
            Some(name) => Identity::with_display_name(email, name),
            None => Identity::new(email),
        };

        Ok(Self {
            identity,
            session_file: config.session_file.clone().map(PathBuf::from),
        })
    }
}

#[async_trait]
impl AuthBackend for DevAuthBackend {
    async fn sign_in(&self) -> AuthResult<Identity> {
        if let Some(path) = &self.session_file {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            let payload = serde_json::to_vec_pretty(&self.identity)?;
            fs::write(path, payload).await?;
            tracing::debug!(path = %path.display(), "Persisted dev session");
        }
        Ok(self.identity.clone())
    }

    async fn sign_out(&self) -> AuthResult<()> {
        if let Some(path) = &self.session_file {
            if fs::try_exists(path).await.unwrap_or(false) {
                fs::remove_file(path).await?;
                tracing::debug!(path = %path.display(), "Removed dev session file");
            }
        }
        Ok(())
    }

    async fn restore(&self) -> AuthResult<Option<Identity>> {
        let Some(path) = &self.session_file else {
            return Ok(None);
        };

        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(None);
        }

        let payload = fs::read(path).await?;
        let identity: Identity = serde_json::from_slice(&payload).map_err(|e| {
            AuthError::RestoreFailed(format!(
                "corrupt session file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Some(identity))
    }
}
