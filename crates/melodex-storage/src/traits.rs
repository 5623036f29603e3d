//! Storage abstraction trait

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for melodex_core::AppError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::NotFound(_) => melodex_core::AppError::NotFound(err.to_string()),
            _ => melodex_core::AppError::Storage(err.to_string()),
        }
    }
}

/// Logical folder an object belongs to. Mirrors the media host's folder
/// layout: audio under `music-tracks`, cover art under `music-covers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
    Tracks,
    Covers,
}

impl MediaFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFolder::Tracks => "music-tracks",
            MediaFolder::Covers => "music-covers",
        }
    }
}

/// Storage abstraction trait
///
/// Both backends (S3, local filesystem) implement this trait so the upload
/// pipeline can work with any backend without coupling to implementation
/// details. No retries, deduplication, or integrity verification happen
/// here beyond what the underlying SDK provides.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a file and return (storage_key, public_url).
    ///
    /// The storage_key is the internal identifier of the object; the
    /// public_url is the externally reachable URL stored on the track record.
    async fn upload(
        &self,
        folder: MediaFolder,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)>;

    /// Delete a file by its storage key
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
