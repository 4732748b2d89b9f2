//! Upload coordinator
//!
//! Tracks one batch of concurrent per-file uploads: one `UploadTask` per
//! selected file, updated in place from that file's transfer event stream.
//! Uploads are independent; a failed transfer never cancels or affects its
//! siblings, and a batch with mixed outcomes is a valid end state. The batch
//! leaves the uploading state only once every task is terminal.

use crate::error::ClientError;
use bytes::Bytes;
use cubby_core::constants::DEFAULT_RETRIEVAL_URL_TTL_SECS;
use cubby_session::Session;
use cubby_storage::{object_key, ObjectStore, TransferEvent, TransferHandle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// One file picked for upload: original filename plus its bytes.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    pub data: Bytes,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Terminal outcome of one upload task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Succeeded { url: String },
    Failed { reason: String },
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Pending)
    }
}

/// Tracked state of one file's transfer within a batch.
///
/// Tasks are keyed by a generated batch-local id, not by file name, so two
/// selected files with the same name track independently.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: Uuid,
    pub file_name: String,
    /// Byte-progress percentage in [0, 100]; only ever moves forward.
    pub progress: f64,
    pub state: TaskState,
}

/// Aggregated task counts for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub pending: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Point-in-time view of the current batch.
#[derive(Debug, Clone)]
pub struct BatchSnapshot {
    pub tasks: Vec<UploadTask>,
    pub counts: BatchCounts,
    /// True iff at least one task in the batch is still pending.
    pub uploading: bool,
}

struct BatchInner {
    /// Generation marker; late callbacks from a replaced batch compare
    /// against this and are dropped.
    batch_id: Uuid,
    tasks: Vec<UploadTask>,
    /// File payloads awaiting `start_upload`, keyed by task id. Drained when
    /// the batch starts.
    selection: Vec<(Uuid, String, Bytes)>,
    uploading: bool,
}

/// Accepts a batch of local files and uploads them concurrently, exposing an
/// aggregated in-flight/completed view to the presentation layer.
pub struct UploadCoordinator {
    store: Arc<dyn ObjectStore>,
    session: Arc<Session>,
    url_ttl: Duration,
    inner: Arc<Mutex<BatchInner>>,
    idle_tx: watch::Sender<bool>,
}

impl UploadCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>, session: Arc<Session>) -> Self {
        Self::with_url_ttl(
            store,
            session,
            Duration::from_secs(DEFAULT_RETRIEVAL_URL_TTL_SECS),
        )
    }

    /// `url_ttl` is the lifetime requested for the retrieval URL resolved
    /// after each successful transfer.
    pub fn with_url_ttl(
        store: Arc<dyn ObjectStore>,
        session: Arc<Session>,
        url_ttl: Duration,
    ) -> Self {
        let (idle_tx, _) = watch::channel(true);
        Self {
            store,
            session,
            url_ttl,
            inner: Arc::new(Mutex::new(BatchInner {
                batch_id: Uuid::new_v4(),
                tasks: Vec::new(),
                selection: Vec::new(),
                uploading: false,
            })),
            idle_tx,
        }
    }

    /// Replace the current batch with one pending task per file.
    ///
    /// Clears prior batch state and display; no backend side effects. Late
    /// updates from a previously started batch are discarded.
    pub fn select_files(&self, files: Vec<LocalFile>) {
        let mut inner = self.inner.lock().unwrap();
        inner.batch_id = Uuid::new_v4();
        inner.tasks.clear();
        inner.selection.clear();
        inner.uploading = false;

        for file in files {
            let id = Uuid::new_v4();
            inner.tasks.push(UploadTask {
                id,
                file_name: file.name.clone(),
                progress: 0.0,
                state: TaskState::Pending,
            });
            inner.selection.push((id, file.name, file.data));
        }

        self.idle_tx.send_replace(true);
        tracing::debug!(files = inner.tasks.len(), "Selected upload batch");
    }

    /// Start uploading the selected batch, one concurrent transfer per file.
    ///
    /// Fails with `NotReady` when no identity is present, the selection is
    /// empty, or a batch is already in flight.
    pub fn start_upload(&self) -> Result<(), ClientError> {
        let identity = self
            .session
            .identity()
            .ok_or_else(|| ClientError::NotReady("not signed in".to_string()))?;

        let (batch_id, transfers) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.uploading {
                return Err(ClientError::NotReady(
                    "an upload batch is already in flight".to_string(),
                ));
            }
            if inner.selection.is_empty() {
                return Err(ClientError::NotReady("no files selected".to_string()));
            }
            inner.uploading = true;
            (inner.batch_id, std::mem::take(&mut inner.selection))
        };
        self.idle_tx.send_replace(false);

        tracing::info!(
            email = %identity.email,
            files = transfers.len(),
            "Starting upload batch"
        );

        for (task_id, file_name, data) in transfers {
            match object_key(&identity, &file_name) {
                Ok(path) => {
                    self.spawn_transfer(batch_id, task_id, path, data);
                }
                Err(e) => {
                    // Scoped to this task; siblings proceed.
                    self.finalize_task(
                        batch_id,
                        task_id,
                        TaskState::Failed {
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        Ok(())
    }

    /// Aggregated view of the current batch, recomputed on demand.
    pub fn snapshot(&self) -> BatchSnapshot {
        let inner = self.inner.lock().unwrap();
        let mut counts = BatchCounts::default();
        for task in &inner.tasks {
            match task.state {
                TaskState::Pending => counts.pending += 1,
                TaskState::Succeeded { .. } => counts.succeeded += 1,
                TaskState::Failed { .. } => counts.failed += 1,
            }
        }
        BatchSnapshot {
            tasks: inner.tasks.clone(),
            counts,
            uploading: inner.uploading,
        }
    }

    /// Discard the batch display. Already-issued transfers keep running at
    /// the backend; their late callbacks are dropped.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.batch_id = Uuid::new_v4();
        inner.tasks.clear();
        inner.selection.clear();
        inner.uploading = false;
        self.idle_tx.send_replace(true);
    }

    /// Resolve once the batch has left the uploading state (every task
    /// terminal, or the batch was reset). Returns immediately when idle.
    pub async fn wait_idle(&self) {
        let mut rx = self.idle_tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    fn spawn_transfer(&self, batch_id: Uuid, task_id: Uuid, path: String, data: Bytes) {
        let store = Arc::clone(&self.store);
        let inner = Arc::clone(&self.inner);
        let idle_tx = self.idle_tx.clone();
        let url_ttl = self.url_ttl;

        tokio::spawn(async move {
            let state = run_transfer(store, &inner, batch_id, task_id, &path, data, url_ttl).await;
            finalize(&inner, &idle_tx, batch_id, task_id, state);
        });
    }

    fn finalize_task(&self, batch_id: Uuid, task_id: Uuid, state: TaskState) {
        finalize(&self.inner, &self.idle_tx, batch_id, task_id, state);
    }
}

/// Drive one file's transfer to its terminal state.
async fn run_transfer(
    store: Arc<dyn ObjectStore>,
    inner: &Arc<Mutex<BatchInner>>,
    batch_id: Uuid,
    task_id: Uuid,
    path: &str,
    data: Bytes,
    url_ttl: Duration,
) -> TaskState {
    let mut handle: TransferHandle = match store.upload(path, data).await {
        Ok(handle) => handle,
        Err(e) => {
            return TaskState::Failed {
                reason: e.to_string(),
            }
        }
    };

    while let Some(event) = handle.next_event().await {
        match event {
            TransferEvent::Progress {
                bytes_transferred,
                total_bytes,
            } => {
                let percent = TransferEvent::percent(bytes_transferred, total_bytes);
                record_progress(inner, batch_id, task_id, percent);
            }
            TransferEvent::Completed => {
                // Bytes are stored; resolve a retrieval URL for display. A
                // URL failure is surfaced on the task even though the object
                // exists (the next listing will still show it).
                return match store.retrieval_url(path, url_ttl).await {
                    Ok(url) => TaskState::Succeeded { url },
                    Err(e) => TaskState::Failed {
                        reason: format!("uploaded, but no retrieval URL: {}", e),
                    },
                };
            }
            TransferEvent::Failed(e) => {
                return TaskState::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    // The backend hung up without a terminal event; treat as failure.
    TaskState::Failed {
        reason: "transfer stream ended without a terminal event".to_string(),
    }
}

/// Apply a progress tick to one task. Ticks may arrive late or repeated; the
/// stored value only moves forward.
fn record_progress(inner: &Arc<Mutex<BatchInner>>, batch_id: Uuid, task_id: Uuid, percent: f64) {
    let mut inner = inner.lock().unwrap();
    if inner.batch_id != batch_id {
        return;
    }
    if let Some(task) = inner.tasks.iter_mut().find(|t| t.id == task_id) {
        if task.state == TaskState::Pending {
            task.progress = task.progress.max(percent.clamp(0.0, 100.0));
        }
    }
}

/// Move one task to a terminal state and, if it was the last pending task of
/// the batch, leave the uploading state.
fn finalize(
    inner: &Arc<Mutex<BatchInner>>,
    idle_tx: &watch::Sender<bool>,
    batch_id: Uuid,
    task_id: Uuid,
    state: TaskState,
) {
    let mut inner = inner.lock().unwrap();
    if inner.batch_id != batch_id {
        return;
    }

    if let Some(task) = inner.tasks.iter_mut().find(|t| t.id == task_id) {
        if task.state.is_terminal() {
            return;
        }
        match &state {
            TaskState::Succeeded { .. } => {
                task.progress = 100.0;
                tracing::info!(file = %task.file_name, "Upload task succeeded");
            }
            TaskState::Failed { reason } => {
                tracing::warn!(file = %task.file_name, reason = %reason, "Upload task failed");
            }
            TaskState::Pending => {}
        }
        task.state = state;
    }

    if inner.uploading && inner.tasks.iter().all(|t| t.state.is_terminal()) {
        inner.uploading = false;
        idle_tx.send_replace(true);
        tracing::info!("Upload batch resolved");
    }
}
