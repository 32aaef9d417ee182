mod error;
mod key;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use key::validate_key;
pub use traits::{BoxReader, ObjectStore};

use crate::config::{StorageBackend, StorageConfig};

/// Build the object store selected by `config.backend`.
///
/// The bucket is not created here; call [`ObjectStore::ensure_bucket`] once at startup.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let store = filesystem::FilesystemObjectStore::new(
                config.filesystem_root.join(&config.bucket),
                config.max_image_size,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => Ok(Arc::new(s3::S3ObjectStore::new(config)?)),
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Unsupported(
            "S3 backend requires the `object-storage` feature",
        )),
    }
}
