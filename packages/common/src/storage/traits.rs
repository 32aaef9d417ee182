use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Key-addressed object storage within a single bucket.
///
/// Implementations are shared across requests for the lifetime of the process.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create the bucket if it does not exist yet. An existing bucket is not an error.
    async fn ensure_bucket(&self) -> Result<(), StorageError>;

    /// Store the contents of `reader` under `key`, replacing any existing object.
    ///
    /// Returns the number of bytes written.
    async fn put_stream(
        &self,
        key: &str,
        reader: BoxReader,
        content_type: Option<&str>,
    ) -> Result<u64, StorageError>;

    /// Issue a GET URL for `key` that stays valid for `expiry`.
    async fn presign_get(&self, key: &str, expiry: Duration) -> Result<String, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}
