use crate::{LocalStore, ObjectStore, StoreBackend, StoreError, StoreResult};
use cubby_core::Config;
use std::sync::Arc;

/// Create an object store backend based on configuration
pub async fn create_store(config: &Config) -> StoreResult<Arc<dyn ObjectStore>> {
    let backend = config.store_backend.unwrap_or(StoreBackend::Local);

    match backend {
        StoreBackend::Local => {
            let base_path = config.local_store_path.clone().ok_or_else(|| {
                StoreError::ConfigError("LOCAL_STORE_PATH not configured".to_string())
            })?;
            let base_url = config.local_store_base_url.clone().ok_or_else(|| {
                StoreError::ConfigError("LOCAL_STORE_BASE_URL not configured".to_string())
            })?;

            let store = LocalStore::new(base_path, base_url).await?;
            Ok(Arc::new(store))
        }

        // The managed remote service is reached through its own SDK by the
        // embedding application; it is not constructed here.
        StoreBackend::Remote => Err(StoreError::ConfigError(
            "Remote store backend is provided by the embedding application".to_string(),
        )),
    }
}
