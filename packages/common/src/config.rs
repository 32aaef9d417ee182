use std::path::PathBuf;

use serde::Deserialize;

/// Which object store implementation backs image uploads.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible service (AWS S3, MinIO, ...).
    #[default]
    S3,
    /// Local directory tree, for development and tests.
    Filesystem,
}

/// What gets persisted as a product's image reference.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceMode {
    /// A time-limited GET URL issued at upload time.
    #[default]
    Presigned,
    /// The object key itself.
    Key,
}

/// Object storage configuration shared by every backend.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Default: `s3`.
    #[serde(default)]
    pub backend: StorageBackend,
    /// S3 endpoint, with or without scheme. Default: "localhost:9000".
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Use https when the endpoint has no scheme. Default: false.
    #[serde(default)]
    pub secure: bool,
    /// Default: "us-east-1".
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Default: "products".
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Root directory for the filesystem backend. Default: "./data/objects".
    #[serde(default = "default_filesystem_root")]
    pub filesystem_root: PathBuf,
    /// Default: `presigned`.
    #[serde(default)]
    pub reference: ReferenceMode,
    /// Validity window of presigned URLs. Default: 7 days.
    #[serde(default = "default_presign_expiry_secs")]
    pub presign_expiry_secs: u32,
    /// Upper bound on a single uploaded image. Default: 10 MiB.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u64,
}

fn default_endpoint() -> String {
    "localhost:9000".into()
}
fn default_region() -> String {
    "us-east-1".into()
}
fn default_bucket() -> String {
    "products".into()
}
fn default_filesystem_root() -> PathBuf {
    PathBuf::from("./data/objects")
}
fn default_presign_expiry_secs() -> u32 {
    7 * 24 * 60 * 60
}
fn default_max_image_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            endpoint: default_endpoint(),
            secure: false,
            region: default_region(),
            access_key: None,
            secret_key: None,
            bucket: default_bucket(),
            filesystem_root: default_filesystem_root(),
            reference: ReferenceMode::default(),
            presign_expiry_secs: default_presign_expiry_secs(),
            max_image_size: default_max_image_size(),
        }
    }
}

impl StorageConfig {
    /// Endpoint URL with an explicit scheme.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            self.endpoint.trim_end_matches('/').to_string()
        } else {
            let scheme = if self.secure { "https" } else { "http" };
            format!("{scheme}://{}", self.endpoint.trim_end_matches('/'))
        }
    }
}
