//! Artifact Storage Module
//!
//! Blob storage for uploaded program archives, keyed by
//! [`Program::artifact_key`](gateway_core::domain::program::Program::artifact_key).

pub mod filesystem;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use filesystem::FilesystemStorage;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Store for artifact bytes
#[async_trait]
pub trait ArtifactStorage: Send + Sync {
    /// Write `data` under `key`, replacing any previous object
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Read the object stored under `key`
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Remove the object stored under `key`
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
