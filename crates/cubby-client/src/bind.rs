//! Session binding
//!
//! Wires the upload coordinator and the file listing to identity changes:
//! every sign-in or sign-out discards the batch display and clears the
//! listing, and a sign-in refetches the new identity's objects.

use crate::listing::FileListing;
use crate::upload::UploadCoordinator;
use cubby_session::Session;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Spawn a watcher that resets both components on every identity change.
///
/// The watcher ends when the session is dropped. Already-issued backend
/// operations are not cancelled; only their display is discarded.
pub fn bind_session(
    session: &Session,
    coordinator: Arc<UploadCoordinator>,
    listing: Arc<FileListing>,
) -> JoinHandle<()> {
    let mut rx = session.subscribe();

    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if state.resolving {
                continue;
            }

            coordinator.reset();
            listing.clear();

            if state.is_signed_in() {
                // Best effort; a failure is recorded in the listing state.
                let _ = listing.refresh().await;
            }
        }
    })
}
