use cubby_storage::StoreError;

/// Client-side operation errors.
///
/// Backend failures are additionally recorded as displayable messages in the
/// owning component's published state; the presentation layer renders those,
/// this type is for programmatic callers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Precondition violation: missing identity, empty selection, or a batch
    /// already in flight.
    #[error("Not ready: {0}")]
    NotReady(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
