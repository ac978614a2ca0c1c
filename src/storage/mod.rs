//! Object-store abstraction for artifact files.
//!
//! Backed by S3-compatible storage in production and by an in-memory map
//! in tests. Keys are flat (no namespacing); the public URL is constructed
//! from the bucket and host rather than read back from the store.

mod memory;
mod s3;

pub use memory::MemoryStore;
pub use s3::{S3Config, S3Store};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object under the given key with the declared content type.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()>;

    /// Delete an object. Deleting an absent key is not an error (S3
    /// semantics).
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// The publicly reachable URL for a key.
    fn public_url(&self, key: &str) -> String;
}
