use thiserror::Error;

/// Errors that can occur during object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object key failed validation.
    #[error("invalid object key: {0}")]
    InvalidKey(&'static str),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The object exceeds the configured size limit.
    #[error("object exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The backend cannot perform this operation.
    #[error("unsupported by this backend: {0}")]
    Unsupported(&'static str),
    /// The remote service rejected or failed the request.
    #[error("object store backend error: {0}")]
    Backend(String),
}
