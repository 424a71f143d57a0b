//! Storage abstraction trait

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What the backend reports for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub key: String,
    /// Entity tag as returned by the backend, quotes included.
    pub etag: Option<String>,
    pub url: String,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `key` with public-read access.
    async fn upload_public(&self, key: &str, data: Vec<u8>) -> StorageResult<UploadReceipt>;
}
