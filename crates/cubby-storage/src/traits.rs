//! Object store abstraction trait
//!
//! This module defines the `ObjectStore` trait that all storage backends must
//! implement, together with the transfer event stream contract used to report
//! upload progress.

use async_trait::async_trait;
use bytes::Bytes;
use cubby_core::StoreBackend;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One object under an identity prefix, as returned by `list`.
///
/// `name` is the original filename; `full_path` is `{prefix}/{name}` and is
/// what `retrieval_url` and `delete` take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub name: String,
    pub full_path: String,
}

/// One event on a transfer stream.
///
/// A transfer emits zero or more `Progress` events followed by exactly one
/// terminal event (`Completed` or `Failed`). Within one transfer,
/// `bytes_transferred` is monotonically non-decreasing; consumers must
/// tolerate repeated ticks and take the latest value only. No ordering is
/// guaranteed across different transfers.
#[derive(Debug)]
pub enum TransferEvent {
    Progress {
        bytes_transferred: u64,
        total_bytes: u64,
    },
    Completed,
    Failed(StoreError),
}

impl TransferEvent {
    /// Progress as a percentage in [0, 100]. A zero-byte transfer reports 100.
    pub fn percent(bytes_transferred: u64, total_bytes: u64) -> f64 {
        if total_bytes == 0 {
            100.0
        } else {
            (bytes_transferred as f64 / total_bytes as f64) * 100.0
        }
    }
}

/// Receiving side of one upload's transfer stream.
pub struct TransferHandle {
    rx: mpsc::Receiver<TransferEvent>,
}

impl TransferHandle {
    /// Create a channel pair for a backend to report transfer events on.
    pub fn channel(buffer: usize) -> (mpsc::Sender<TransferEvent>, TransferHandle) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, TransferHandle { rx })
    }

    /// Next event on the stream; `None` once the backend has hung up after
    /// its terminal event.
    pub async fn next_event(&mut self) -> Option<TransferEvent> {
        self.rx.recv().await
    }
}

/// Object store abstraction trait
///
/// Storage backends (local filesystem; the managed remote service in
/// production) implement this trait. Components are handed an
/// `Arc<dyn ObjectStore>` so fakes can be substituted in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all objects directly under `prefix`. An unknown prefix yields an
    /// empty list, not an error.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectRef>>;

    /// Issue a time-bounded retrieval URL for an object.
    async fn retrieval_url(&self, full_path: &str, expires_in: Duration) -> StoreResult<String>;

    /// Start uploading `data` to `full_path` and return the transfer stream.
    ///
    /// The call returns once the transfer has been issued; progress and the
    /// terminal outcome arrive on the returned handle. Uploading to an
    /// existing path overwrites it.
    async fn upload(&self, full_path: &str, data: Bytes) -> StoreResult<TransferHandle>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, full_path: &str) -> StoreResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StoreBackend;
}
