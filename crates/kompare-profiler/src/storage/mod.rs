//! Object storage: the bucket/key byte store the loader reads from and the
//! publisher writes to.

pub mod remote;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageError;

pub use remote::ObjectStoreBackend;

/// An object read back from storage.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError>;

    /// Writes a new object. Fails with [`StorageError::AlreadyExists`]
    /// instead of overwriting.
    async fn put_new(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;
}
