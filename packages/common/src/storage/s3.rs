use std::time::Duration;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{info, warn};

use super::error::StorageError;
use super::key::validate_key;
use super::traits::{BoxReader, ObjectStore};
use crate::config::StorageConfig;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// S3-compatible object store (AWS S3, MinIO) using path-style addressing.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
}

impl S3ObjectStore {
    /// Build a client for `config.bucket` at `config.endpoint`. No network I/O happens here.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let (access_key, secret_key) = match (&config.access_key, &config.secret_key) {
            (Some(a), Some(s)) if !a.is_empty() && !s.is_empty() => (a.as_str(), s.as_str()),
            _ => {
                return Err(StorageError::Backend(
                    "S3 backend requires storage.access_key and storage.secret_key".into(),
                ));
            }
        };

        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint_url(),
        };

        let bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(backend_error)?
            .with_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
        })
    }
}

fn backend_error(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        let name = self.bucket.name();

        let created = Bucket::create_with_path_style(
            &name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match created {
            Ok(response) if response.success() => {
                info!(bucket = %name, "Created bucket");
                return Ok(());
            }
            Ok(response) => {
                warn!(
                    bucket = %name,
                    status = response.response_code,
                    "Bucket creation rejected, checking whether it already exists"
                );
            }
            Err(e) => {
                warn!(bucket = %name, error = %e, "Bucket creation failed, checking whether it already exists");
            }
        }

        if self.bucket.exists().await.map_err(backend_error)? {
            info!(bucket = %name, "Bucket already exists");
            Ok(())
        } else {
            Err(StorageError::Backend(format!(
                "failed to create bucket '{name}'"
            )))
        }
    }

    async fn put_stream(
        &self,
        key: &str,
        mut reader: BoxReader,
        content_type: Option<&str>,
    ) -> Result<u64, StorageError> {
        let key = validate_key(key)?;
        let response = self
            .bucket
            .put_object_stream_with_content_type(
                &mut reader,
                key,
                content_type.unwrap_or(DEFAULT_CONTENT_TYPE),
            )
            .await
            .map_err(backend_error)?;

        if !is_success(response.status_code()) {
            return Err(StorageError::Backend(format!(
                "upload of '{key}' failed with status {}",
                response.status_code()
            )));
        }

        Ok(response.uploaded_bytes() as u64)
    }

    async fn presign_get(&self, key: &str, expiry: Duration) -> Result<String, StorageError> {
        let key = validate_key(key)?;
        let expiry_secs = u32::try_from(expiry.as_secs()).unwrap_or(u32::MAX);
        self.bucket
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(backend_error)
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let key = validate_key(key)?;
        match self.bucket.head_object(key).await {
            Ok((_, status)) if is_success(status) => Ok(true),
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) => Err(StorageError::Backend(format!(
                "HEAD '{key}' failed with status {status}"
            ))),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(backend_error(e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let key = validate_key(key)?;
        if !self.exists(key).await? {
            return Ok(false);
        }

        let response = self.bucket.delete_object(key).await.map_err(backend_error)?;
        let status = response.status_code();
        if is_success(status) {
            Ok(true)
        } else if status == 404 {
            Ok(false)
        } else {
            Err(StorageError::Backend(format!(
                "delete of '{key}' failed with status {status}"
            )))
        }
    }
}
