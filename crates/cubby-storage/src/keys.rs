//! Shared object path generation for storage backends.
//!
//! Path format: `{email}/{original filename}`. The identity prefix partitions
//! the store; no object is addressable outside its owning prefix.

use crate::traits::{StoreError, StoreResult};
use cubby_core::Identity;

/// Build the object path for a file owned by `identity`.
///
/// Rejects empty filenames and filenames that could escape the identity
/// prefix. All backends and callers must use this format for consistency.
pub fn object_key(identity: &Identity, filename: &str) -> StoreResult<String> {
    if filename.is_empty() {
        return Err(StoreError::InvalidPath("empty filename".to_string()));
    }
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(StoreError::InvalidPath(format!(
            "filename contains path separators: {}",
            filename
        )));
    }
    Ok(format!("{}/{}", identity.prefix(), filename))
}
