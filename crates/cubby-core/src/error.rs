//! Error types module
//!
//! Component-specific errors (`StoreError`, `AuthError`, `ClientError`) live
//! with their components; this module only holds what is shared at the core.

/// Configuration errors raised while building a [`crate::Config`] or while a
/// component validates the configuration handed to it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}
