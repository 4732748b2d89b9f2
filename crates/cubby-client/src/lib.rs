//! Cubby Client Library
//!
//! UI-facing state management for per-user file storage: the upload
//! coordinator (concurrent multi-file upload tracking with per-task progress
//! and error aggregation) and the file listing view-model (snapshot listing,
//! per-object deletion with a confirmation gate). Both are driven by an
//! identity session from `cubby-session` and an object store from
//! `cubby-storage`; the presentation layer renders their published state.

pub mod bind;
pub mod confirm;
pub mod error;
pub mod listing;
pub mod telemetry;
pub mod upload;

// Re-export commonly used types
pub use bind::bind_session;
pub use confirm::{AlwaysConfirm, ConfirmPrompt, NeverConfirm};
pub use error::ClientError;
pub use listing::{DeleteOutcome, FileListing, ListState};
pub use telemetry::init_telemetry;
pub use upload::{BatchCounts, BatchSnapshot, LocalFile, TaskState, UploadCoordinator, UploadTask};
