use crate::traits::{
    ObjectRef, ObjectStore, StoreError, StoreResult, TransferEvent, TransferHandle,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use cubby_core::constants::{TRANSFER_EVENT_BUFFER, UPLOAD_CHUNK_SIZE};
use cubby_core::StoreBackend;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem object store implementation
#[derive(Clone)]
pub struct LocalStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStore {
    /// Create a new LocalStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/cubby/objects")
    /// * `base_url` - Base URL embedded in retrieval URLs (e.g., "http://localhost:3000/objects")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StoreResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StoreError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore {
            base_path,
            base_url,
        })
    }

    /// Convert an object path to a filesystem path, rejecting traversal
    /// sequences that could escape the base directory.
    fn object_path_to_fs_path(&self, full_path: &str) -> StoreResult<PathBuf> {
        if full_path.is_empty()
            || full_path.contains("..")
            || full_path.starts_with('/')
            || full_path.contains('\\')
        {
            return Err(StoreError::InvalidPath(
                "Object path contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(full_path);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StoreError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        // Paths that exist (e.g. symlinked entries) must still resolve inside
        // the base directory; paths that do not exist yet cannot escape given
        // the checks above.
        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StoreError::InvalidPath(
                    "Object path resolves outside the storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Generate a retrieval URL for an object path.
    fn generate_url(&self, full_path: &str, expires_in: Duration) -> String {
        let expires_at = Utc::now().timestamp() + expires_in.as_secs() as i64;
        format!(
            "{}/{}?expires={}",
            self.base_url.trim_end_matches('/'),
            full_path,
            expires_at
        )
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write `data` to `path` chunk by chunk, reporting one progress tick per
    /// written chunk on `tx`.
    async fn write_chunked(
        path: &Path,
        data: &[u8],
        tx: &tokio::sync::mpsc::Sender<TransferEvent>,
    ) -> StoreResult<()> {
        let total_bytes = data.len() as u64;

        let mut file = fs::File::create(path).await.map_err(|e| {
            StoreError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let mut written: u64 = 0;
        for chunk in data.chunks(UPLOAD_CHUNK_SIZE) {
            file.write_all(chunk).await.map_err(|e| {
                StoreError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += chunk.len() as u64;
            let _ = tx
                .send(TransferEvent::Progress {
                    bytes_transferred: written,
                    total_bytes,
                })
                .await;
        }

        if total_bytes == 0 {
            let _ = tx
                .send(TransferEvent::Progress {
                    bytes_transferred: 0,
                    total_bytes: 0,
                })
                .await;
        }

        file.sync_all().await.map_err(|e| {
            StoreError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectRef>> {
        let dir = self.object_path_to_fs_path(prefix)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            StoreError::FetchFailed(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StoreError::FetchFailed(format!("Failed to read directory entry: {}", e))
        })? {
            let file_type = entry.file_type().await.map_err(|e| {
                StoreError::FetchFailed(format!("Failed to stat directory entry: {}", e))
            })?;
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            objects.push(ObjectRef {
                full_path: format!("{}/{}", prefix, name),
                name,
            });
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::info!(
            prefix = %prefix,
            count = objects.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local store list successful"
        );

        Ok(objects)
    }

    async fn retrieval_url(&self, full_path: &str, expires_in: Duration) -> StoreResult<String> {
        let path = self.object_path_to_fs_path(full_path)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(full_path.to_string()));
        }

        Ok(self.generate_url(full_path, expires_in))
    }

    async fn upload(&self, full_path: &str, data: Bytes) -> StoreResult<TransferHandle> {
        let path = self.object_path_to_fs_path(full_path)?;
        self.ensure_parent_dir(&path).await?;

        let (tx, handle) = TransferHandle::channel(TRANSFER_EVENT_BUFFER);
        let full_path = full_path.to_string();

        tokio::spawn(async move {
            let size = data.len();
            let start = std::time::Instant::now();

            match Self::write_chunked(&path, &data, &tx).await {
                Ok(()) => {
                    tracing::info!(
                        path = %path.display(),
                        key = %full_path,
                        size_bytes = size,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Local store upload successful"
                    );
                    let _ = tx.send(TransferEvent::Completed).await;
                }
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        key = %full_path,
                        error = %e,
                        "Local store upload failed"
                    );
                    let _ = tx.send(TransferEvent::Failed(e)).await;
                }
            }
        });

        Ok(handle)
    }

    async fn delete(&self, full_path: &str) -> StoreResult<()> {
        let path = self.object_path_to_fs_path(full_path)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StoreError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %full_path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local store delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn drain(mut handle: TransferHandle) -> (Vec<(u64, u64)>, bool) {
        let mut ticks = Vec::new();
        let mut completed = false;
        while let Some(event) = handle.next_event().await {
            match event {
                TransferEvent::Progress {
                    bytes_transferred,
                    total_bytes,
                } => ticks.push((bytes_transferred, total_bytes)),
                TransferEvent::Completed => completed = true,
                TransferEvent::Failed(_) => completed = false,
            }
        }
        (ticks, completed)
    }

    #[tokio::test]
    async fn test_upload_emits_progress_then_terminal() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        let data = Bytes::from(vec![7u8; UPLOAD_CHUNK_SIZE * 2 + 17]);
        let total = data.len() as u64;
        let handle = store.upload("a@x.com/blob.bin", data).await.unwrap();

        let (ticks, completed) = drain(handle).await;
        assert!(completed);
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks.last().unwrap(), &(total, total));
        // ticks are monotonically non-decreasing
        assert!(ticks.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[tokio::test]
    async fn test_upload_zero_byte_file() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        let handle = store.upload("a@x.com/empty.txt", Bytes::new()).await.unwrap();
        let (ticks, completed) = drain(handle).await;
        assert!(completed);
        assert_eq!(ticks, vec![(0, 0)]);
    }

    #[tokio::test]
    async fn test_upload_then_list_and_url() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        let handle = store
            .upload("a@x.com/report.pdf", Bytes::from_static(b"0123456789"))
            .await
            .unwrap();
        drain(handle).await;

        let objects = store.list("a@x.com").await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "report.pdf");
        assert_eq!(objects[0].full_path, "a@x.com/report.pdf");

        let url = store
            .retrieval_url("a@x.com/report.pdf", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:3000/objects/a@x.com/report.pdf?expires="));
    }

    #[tokio::test]
    async fn test_list_unknown_prefix_is_empty() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        let objects = store.list("nobody@x.com").await.unwrap();
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn test_list_is_prefix_scoped() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        drain(
            store
                .upload("a@x.com/mine.txt", Bytes::from_static(b"a"))
                .await
                .unwrap(),
        )
        .await;
        drain(
            store
                .upload("b@x.com/theirs.txt", Bytes::from_static(b"b"))
                .await
                .unwrap(),
        )
        .await;

        let objects = store.list("a@x.com").await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "mine.txt");
    }

    #[tokio::test]
    async fn test_reupload_overwrites() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        drain(
            store
                .upload("a@x.com/note.txt", Bytes::from_static(b"first"))
                .await
                .unwrap(),
        )
        .await;
        drain(
            store
                .upload("a@x.com/note.txt", Bytes::from_static(b"second"))
                .await
                .unwrap(),
        )
        .await;

        let objects = store.list("a@x.com").await.unwrap();
        assert_eq!(objects.len(), 1);

        let content = fs::read(dir.path().join("a@x.com/note.txt")).await.unwrap();
        assert_eq!(content, b"second");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        let result = store.list("../../../etc").await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));

        let result = store.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));

        let result = store
            .retrieval_url("/etc/passwd", Duration::from_secs(60))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_rejected() {
        let outside = tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        std::fs::create_dir_all(dir.path().join("a@x.com")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("a@x.com/escape.txt"),
        )
        .unwrap();

        let result = store
            .retrieval_url("a@x.com/escape.txt", Duration::from_secs(60))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));

        let result = store.delete("a@x.com/escape.txt").await;
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        assert!(store.delete("a@x.com/nothing.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_retrieval_url_missing_object() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:3000/objects".to_string())
            .await
            .unwrap();

        let result = store
            .retrieval_url("a@x.com/ghost.pdf", Duration::from_secs(60))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
