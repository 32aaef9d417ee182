use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use common::storage::{BoxReader, ObjectStore, StorageError};
use common::{ReferenceMode, StorageConfig};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An uploaded image spooled to a temporary file, waiting to be stored.
///
/// The temporary file is removed when this value is dropped.
#[derive(Debug)]
pub struct StagedImage {
    path: PathBuf,
    size: u64,
    file_name: Option<String>,
    content_type: Option<String>,
}

impl StagedImage {
    pub(crate) fn new(
        path: PathBuf,
        size: u64,
        file_name: Option<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            path,
            size,
            file_name,
            content_type,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    /// Declared content type, else a guess from the filename.
    pub fn content_type(&self) -> String {
        self.content_type
            .clone()
            .filter(|ct| !ct.is_empty())
            .or_else(|| {
                self.file_name
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first())
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
    }

    /// File extension for the object key, without the dot.
    fn extension(&self) -> Option<String> {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        from_name
            .or_else(|| {
                mime_guess::get_mime_extensions_str(&self.content_type())
                    .and_then(|exts| exts.first())
                    .map(|ext| ext.to_string())
            })
            .filter(|ext| {
                !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
    }
}

impl Drop for StagedImage {
    fn drop(&mut self) {
        // Best effort.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Where a stored image lives and what to hand back to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Object key, kept to delete or replace the image later.
    pub key: String,
    /// Persisted image reference: a presigned URL or the key itself.
    pub url: String,
}

/// Product image gateway over an [`ObjectStore`].
#[derive(Clone)]
pub struct ImageStorage {
    store: Arc<dyn ObjectStore>,
    reference: ReferenceMode,
    presign_expiry: Duration,
}

impl ImageStorage {
    pub fn new(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            reference: config.reference,
            presign_expiry: Duration::from_secs(u64::from(config.presign_expiry_secs)),
        }
    }

    /// Make sure the bucket exists. Called once at startup.
    pub async fn initialize(&self) -> Result<(), StorageError> {
        self.store.ensure_bucket().await
    }

    /// Store `image` under a fresh key and produce its reference.
    ///
    /// Presigned references expire after the configured window; callers must not
    /// treat them as permanent.
    #[instrument(skip(self, image), fields(size = image.size()))]
    pub async fn upload(&self, image: &StagedImage) -> Result<StoredImage, StorageError> {
        let key = match image.extension() {
            Some(ext) => format!("images/{}.{ext}", Uuid::new_v4()),
            None => format!("images/{}", Uuid::new_v4()),
        };
        let content_type = image.content_type();

        let file = tokio::fs::File::open(&image.path).await?;
        let reader: BoxReader = Box::new(file);
        let written = self
            .store
            .put_stream(&key, reader, Some(&content_type))
            .await?;

        let url = match self.reference {
            ReferenceMode::Key => key.clone(),
            ReferenceMode::Presigned => {
                match self.store.presign_get(&key, self.presign_expiry).await {
                    Ok(url) => url,
                    Err(e) => {
                        self.discard(&key).await;
                        return Err(e);
                    }
                }
            }
        };

        info!(key = %key, bytes = written, content_type = %content_type, "Stored product image");
        Ok(StoredImage { key, url })
    }

    /// Remove an image. Returns `false` if it was already gone.
    pub async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.store.delete(key).await
    }

    /// Delete an image without failing the caller; errors are only logged.
    pub async fn discard(&self, key: &str) {
        match self.delete(key).await {
            Ok(_) => info!(key = %key, "Removed product image"),
            Err(e) => warn!(key = %key, error = %e, "Failed to remove product image, leaving orphan"),
        }
    }
}
