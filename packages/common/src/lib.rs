pub mod config;
pub mod storage;

pub use config::{ReferenceMode, StorageBackend, StorageConfig};
