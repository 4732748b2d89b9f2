//! Cubby Core Library
//!
//! This crate provides core domain models, error types, and configuration
//! that are shared across all Cubby components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod store_types;

// Re-export commonly used types
pub use config::Config;
pub use error::ConfigError;
pub use models::{Identity, StoredObject};
pub use store_types::StoreBackend;
// Note: ObjectStore, StoreError, StoreResult live in the cubby-storage crate.
// Import them directly from cubby-storage instead of cubby-core.
