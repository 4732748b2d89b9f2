//! File listing view-model
//!
//! Holds a best-effort snapshot of the signed-in user's objects: listed on
//! demand, one retrieval URL resolved per object, entries removed locally
//! only after a confirmed, successful backend delete. The snapshot can go
//! stale relative to the backend until the next `refresh`.

use crate::confirm::ConfirmPrompt;
use crate::error::ClientError;
use cubby_core::constants::DEFAULT_RETRIEVAL_URL_TTL_SECS;
use cubby_core::{Identity, StoredObject};
use cubby_session::Session;
use cubby_storage::{ObjectStore, StoreResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Published listing state, rendered by the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub files: Vec<StoredObject>,
    pub loading: bool,
    /// Displayable message from the last failed refresh or delete; cleared
    /// when the next operation starts.
    pub error: Option<String>,
    /// Display names with a delete in flight, so the UI can show per-row
    /// state while other rows remain interactive.
    pub deleting: HashSet<String>,
}

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The confirmation gate declined; no backend call was made.
    Declined,
}

pub struct FileListing {
    store: Arc<dyn ObjectStore>,
    session: Arc<Session>,
    confirm: Arc<dyn ConfirmPrompt>,
    url_ttl: Duration,
    state: Arc<Mutex<ListState>>,
}

impl FileListing {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        session: Arc<Session>,
        confirm: Arc<dyn ConfirmPrompt>,
    ) -> Self {
        Self::with_url_ttl(
            store,
            session,
            confirm,
            Duration::from_secs(DEFAULT_RETRIEVAL_URL_TTL_SECS),
        )
    }

    pub fn with_url_ttl(
        store: Arc<dyn ObjectStore>,
        session: Arc<Session>,
        confirm: Arc<dyn ConfirmPrompt>,
        url_ttl: Duration,
    ) -> Self {
        Self {
            store,
            session,
            confirm,
            url_ttl,
            state: Arc::new(Mutex::new(ListState::default())),
        }
    }

    /// Refresh the snapshot from the backend.
    ///
    /// Without an identity the list is cleared and the call succeeds. On a
    /// listing or URL-resolution failure the previous snapshot is preserved
    /// and the error recorded alongside it. Last write wins when refreshes
    /// overlap.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let Some(identity) = self.session.identity() else {
            let mut state = self.state.lock().unwrap();
            state.files.clear();
            state.error = None;
            return Ok(());
        };

        {
            let mut state = self.state.lock().unwrap();
            state.loading = true;
            state.error = None;
        }

        let fetched = self.fetch(&identity).await;

        let mut state = self.state.lock().unwrap();
        state.loading = false;
        match fetched {
            Ok(files) => {
                tracing::debug!(email = %identity.email, count = files.len(), "Listing refreshed");
                state.files = files;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(email = %identity.email, error = %e, "Listing refresh failed");
                state.error = Some(format!("Error fetching files: {}", e));
                Err(e.into())
            }
        }
    }

    async fn fetch(&self, identity: &Identity) -> StoreResult<Vec<StoredObject>> {
        let refs = self.store.list(identity.prefix()).await?;

        let resolves = refs.into_iter().map(|object| {
            let store = Arc::clone(&self.store);
            let url_ttl = self.url_ttl;
            async move {
                let url = store.retrieval_url(&object.full_path, url_ttl).await?;
                Ok(StoredObject {
                    name: object.name,
                    full_path: object.full_path,
                    url,
                })
            }
        });

        futures::future::try_join_all(resolves).await
    }

    /// Delete one object after user confirmation.
    ///
    /// Declined confirmation makes no backend call. On success exactly the
    /// entry with `full_path` is removed from the snapshot (a no-op when it
    /// is not present); on failure the snapshot is left unchanged.
    pub async fn delete(
        &self,
        full_path: &str,
        display_name: &str,
    ) -> Result<DeleteOutcome, ClientError> {
        let message = format!("Are you sure you want to delete {}?", display_name);
        if !self.confirm.confirm(&message).await {
            tracing::debug!(file = %display_name, "Delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        {
            let mut state = self.state.lock().unwrap();
            state.deleting.insert(display_name.to_string());
            state.error = None;
        }

        let result = self.store.delete(full_path).await;

        let mut state = self.state.lock().unwrap();
        state.deleting.remove(display_name);
        match result {
            Ok(()) => {
                state.files.retain(|f| f.full_path != full_path);
                tracing::info!(key = %full_path, "Object deleted");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                tracing::warn!(key = %full_path, error = %e, "Delete failed");
                state.error = Some(format!("Error deleting file {}: {}", display_name, e));
                Err(e.into())
            }
        }
    }

    /// Reset to the empty, unauthenticated state.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.files.clear();
        state.error = None;
        state.deleting.clear();
        state.loading = false;
    }

    /// Current published state snapshot.
    pub fn state(&self) -> ListState {
        self.state.lock().unwrap().clone()
    }

    /// Current file snapshot.
    pub fn files(&self) -> Vec<StoredObject> {
        self.state.lock().unwrap().files.clone()
    }
}
