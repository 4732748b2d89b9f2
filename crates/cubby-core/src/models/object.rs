use serde::{Deserialize, Serialize};

/// One stored object as presented by the file listing.
///
/// `full_path` is `{email}/{original filename}` and is the stable address of
/// the object; `url` is a time-bounded retrieval URL regenerated on every
/// listing, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub name: String,
    pub full_path: String,
    pub url: String,
}
