//! Cubby Storage Library
//!
//! This crate provides the object store abstraction and implementations for
//! Cubby. It includes the `ObjectStore` trait, the transfer event stream
//! contract used for upload progress, and the local filesystem backend.
//!
//! # Object path format
//!
//! Object paths are identity-scoped: `{email}/{original filename}`. No object
//! is addressable outside its owning identity's prefix. Paths must not contain
//! `..` or a leading `/`. Path generation is centralized in the `keys` module
//! so callers and backends stay consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use cubby_core::StoreBackend;
pub use factory::create_store;
pub use keys::object_key;
pub use local::LocalStore;
pub use traits::{
    ObjectRef, ObjectStore, StoreError, StoreResult, TransferEvent, TransferHandle,
};
