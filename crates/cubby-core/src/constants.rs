/// Default lifetime in seconds of a retrieval URL issued for a listed object.
pub const DEFAULT_RETRIEVAL_URL_TTL_SECS: u64 = 3600;

/// Chunk size in bytes used by backends that write uploads incrementally.
/// Each written chunk produces one progress tick on the transfer stream.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Buffer size of the transfer event channel handed out by `upload`.
pub const TRANSFER_EVENT_BUFFER: usize = 32;
