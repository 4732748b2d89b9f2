//! Shared test helpers: a scriptable mock object store and a stub auth
//! backend, so the coordinator and listing can be exercised without a real
//! backend.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use cubby_core::constants::TRANSFER_EVENT_BUFFER;
use cubby_core::{Identity, StoreBackend};
use cubby_session::{AuthBackend, AuthError, AuthResult, Session};
use cubby_storage::{
    ObjectRef, ObjectStore, StoreError, StoreResult, TransferEvent, TransferHandle,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock object store with scriptable failures.
///
/// Uploads report four progress ticks (spaced by `tick_delay`) and then a
/// terminal event; scripted failures fail the transfer after the second tick.
#[derive(Clone)]
pub struct MockStore {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    fail_uploads: Arc<Mutex<HashSet<String>>>,
    fail_urls: Arc<Mutex<HashSet<String>>>,
    fail_deletes: Arc<Mutex<HashSet<String>>>,
    fail_list: Arc<AtomicBool>,
    delete_calls: Arc<Mutex<Vec<String>>>,
    tick_delay: Duration,
}

impl MockStore {
    pub fn new() -> Self {
        Self::with_tick_delay(Duration::from_millis(2))
    }

    pub fn with_tick_delay(tick_delay: Duration) -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_uploads: Arc::new(Mutex::new(HashSet::new())),
            fail_urls: Arc::new(Mutex::new(HashSet::new())),
            fail_deletes: Arc::new(Mutex::new(HashSet::new())),
            fail_list: Arc::new(AtomicBool::new(false)),
            delete_calls: Arc::new(Mutex::new(Vec::new())),
            tick_delay,
        }
    }

    pub fn seed(&self, full_path: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(full_path.to_string(), Bytes::copy_from_slice(data));
    }

    pub fn contains(&self, full_path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(full_path)
    }

    pub fn fail_upload(&self, full_path: &str) {
        self.fail_uploads
            .lock()
            .unwrap()
            .insert(full_path.to_string());
    }

    pub fn fail_url(&self, full_path: &str) {
        self.fail_urls.lock().unwrap().insert(full_path.to_string());
    }

    pub fn fail_delete(&self, full_path: &str) {
        self.fail_deletes
            .lock()
            .unwrap()
            .insert(full_path.to_string());
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectRef>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::FetchFailed(
                "simulated listing failure".to_string(),
            ));
        }

        let wanted = format!("{}/", prefix);
        let mut objects: Vec<ObjectRef> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|path| path.starts_with(&wanted))
            .map(|path| ObjectRef {
                name: path[wanted.len()..].to_string(),
                full_path: path.clone(),
            })
            .collect();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    async fn retrieval_url(&self, full_path: &str, expires_in: Duration) -> StoreResult<String> {
        if self.fail_urls.lock().unwrap().contains(full_path) {
            return Err(StoreError::FetchFailed(
                "simulated URL resolution failure".to_string(),
            ));
        }
        if !self.objects.lock().unwrap().contains_key(full_path) {
            return Err(StoreError::NotFound(full_path.to_string()));
        }
        Ok(format!(
            "https://objects.example/{}?ttl={}",
            full_path,
            expires_in.as_secs()
        ))
    }

    async fn upload(&self, full_path: &str, data: Bytes) -> StoreResult<TransferHandle> {
        let (tx, handle) = TransferHandle::channel(TRANSFER_EVENT_BUFFER);

        let fail = self.fail_uploads.lock().unwrap().contains(full_path);
        let objects = Arc::clone(&self.objects);
        let full_path = full_path.to_string();
        let tick_delay = self.tick_delay;

        tokio::spawn(async move {
            let total = data.len() as u64;

            if total == 0 {
                let _ = tx
                    .send(TransferEvent::Progress {
                        bytes_transferred: 0,
                        total_bytes: 0,
                    })
                    .await;
            }

            for i in 1..=4u64 {
                if total == 0 {
                    break;
                }
                tokio::time::sleep(tick_delay).await;
                let _ = tx
                    .send(TransferEvent::Progress {
                        bytes_transferred: total * i / 4,
                        total_bytes: total,
                    })
                    .await;
                if fail && i == 2 {
                    let _ = tx
                        .send(TransferEvent::Failed(StoreError::UploadFailed(
                            "simulated transfer failure".to_string(),
                        )))
                        .await;
                    return;
                }
            }

            if fail {
                let _ = tx
                    .send(TransferEvent::Failed(StoreError::UploadFailed(
                        "simulated transfer failure".to_string(),
                    )))
                    .await;
                return;
            }

            objects.lock().unwrap().insert(full_path, data);
            let _ = tx.send(TransferEvent::Completed).await;
        });

        Ok(handle)
    }

    async fn delete(&self, full_path: &str) -> StoreResult<()> {
        self.delete_calls
            .lock()
            .unwrap()
            .push(full_path.to_string());

        if self.fail_deletes.lock().unwrap().contains(full_path) {
            return Err(StoreError::DeleteFailed(
                "simulated delete failure".to_string(),
            ));
        }

        self.objects.lock().unwrap().remove(full_path);
        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Remote
    }
}

/// Stub auth backend whose identity can be swapped between sign-ins.
pub struct StubAuth {
    identity: Mutex<Option<Identity>>,
}

impl StubAuth {
    pub fn with_email(email: &str) -> Self {
        Self {
            identity: Mutex::new(Some(Identity::new(email))),
        }
    }

    pub fn set_identity(&self, identity: Identity) {
        *self.identity.lock().unwrap() = Some(identity);
    }
}

#[async_trait]
impl AuthBackend for StubAuth {
    async fn sign_in(&self) -> AuthResult<Identity> {
        self.identity
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AuthError::SignInFailed("no identity configured".to_string()))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        Ok(())
    }

    async fn restore(&self) -> AuthResult<Option<Identity>> {
        Ok(None)
    }
}

/// Session restored and signed in as `email`.
pub async fn signed_in_session(email: &str) -> Arc<Session> {
    let session = Arc::new(Session::new(Arc::new(StubAuth::with_email(email))));
    session.restore().await.unwrap();
    session.sign_in().await.unwrap();
    session
}

/// Session restored but signed out.
pub async fn signed_out_session() -> Arc<Session> {
    let session = Arc::new(Session::new(Arc::new(StubAuth::with_email("unused@x.com"))));
    session.restore().await.unwrap();
    session
}

/// Poll `cond` until it holds, panicking after ~2 seconds.
pub async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within timeout");
}
