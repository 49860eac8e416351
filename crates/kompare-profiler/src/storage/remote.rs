use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3Builder, S3ConditionalPut};
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutMode, PutOptions, PutPayload};
use tracing::debug;

use crate::error::StorageError;

use super::{ObjectStorage, StoredObject};

#[derive(Debug, Clone, Copy)]
enum BucketKind {
    AmazonS3,
    InMemory,
}

/// [`ObjectStorage`] over the `object_store` crate, one store per bucket.
///
/// Buckets are opened on first use and cached for the lifetime of the
/// backend, so a single invocation reuses its connections.
pub struct ObjectStoreBackend {
    kind: BucketKind,
    buckets: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStoreBackend {
    /// S3 buckets; credentials and region come from the standard AWS
    /// environment variables.
    pub fn amazon_s3() -> Self {
        Self::with_kind(BucketKind::AmazonS3)
    }

    /// Buckets held in process memory, created empty on first use.
    pub fn in_memory() -> Self {
        Self::with_kind(BucketKind::InMemory)
    }

    fn with_kind(kind: BucketKind) -> Self {
        Self {
            kind,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Uses `store` for `bucket` instead of opening one.
    pub fn register_bucket(
        &self,
        bucket: &str,
        store: Arc<dyn ObjectStore>,
    ) -> Result<(), StorageError> {
        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        buckets.insert(bucket.to_string(), store);
        Ok(())
    }

    fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        {
            let buckets = self.buckets.read().map_err(|_| StorageError::LockPoisoned)?;
            if let Some(store) = buckets.get(name) {
                return Ok(Arc::clone(store));
            }
        }

        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        if let Some(store) = buckets.get(name) {
            return Ok(Arc::clone(store));
        }

        let store = self.open_bucket(name)?;
        debug!(bucket = name, kind = ?self.kind, "opened bucket");
        buckets.insert(name.to_string(), Arc::clone(&store));
        Ok(store)
    }

    fn open_bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        match self.kind {
            BucketKind::AmazonS3 => {
                let s3 = AmazonS3Builder::from_env()
                    .with_bucket_name(name)
                    .with_conditional_put(S3ConditionalPut::ETagMatch)
                    .build()
                    .map_err(|e| StorageError::Configuration {
                        bucket: name.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(Arc::new(s3))
            }
            BucketKind::InMemory => Ok(Arc::new(InMemory::new())),
        }
    }
}

fn object_path(key: &str) -> Result<ObjectPath, StorageError> {
    ObjectPath::parse(key).map_err(|e| StorageError::InvalidKey {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn map_error(bucket: &str, key: &str, err: object_store::Error) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        object_store::Error::AlreadyExists { .. } => StorageError::AlreadyExists {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        other => StorageError::Backend {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl ObjectStorage for ObjectStoreBackend {
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let store = self.bucket(bucket)?;
        let path = object_path(key)?;

        let result = store
            .get(&path)
            .await
            .map_err(|e| map_error(bucket, key, e))?;
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| {
                let value: &str = value.as_ref();
                value.to_string()
            });
        let body = result
            .bytes()
            .await
            .map_err(|e| map_error(bucket, key, e))?;

        Ok(StoredObject { body, content_type })
    }

    async fn put_new(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let store = self.bucket(bucket)?;
        let path = object_path(key)?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            mode: PutMode::Create,
            attributes,
            ..Default::default()
        };

        store
            .put_opts(&path, PutPayload::from(body), options)
            .await
            .map_err(|e| map_error(bucket, key, e))?;
        Ok(())
    }
}
