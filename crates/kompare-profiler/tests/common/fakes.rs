//! Test doubles.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use kompare_profiler::db::DatabaseError;
use kompare_profiler::error::{ProfilingError, StorageError, StoreError};
use kompare_profiler::report::{Document, ReportConfig, ReportEngine};
use kompare_profiler::storage::{ObjectStorage, ObjectStoreBackend, StoredObject};
use kompare_profiler::store::{Completion, JobRecord, JobStatus, JobStore, MemoryJobStore};
use kompare_profiler::tabular::TabularData;

pub const DEFAULT_HTML: &str = "<!doctype html><html><body>profile</body></html>";

/// Report engine returning a fixed document or a fixed failure.
pub struct FakeEngine {
    response: Result<String, String>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(TabularData, ReportConfig)>>,
}

impl FakeEngine {
    pub fn html(html: &str) -> Self {
        Self::with_response(Ok(html.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_response(Err(message.to_string()))
    }

    fn with_response(response: Result<String, String>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Inputs of every call, in order.
    pub fn seen(&self) -> Vec<(TabularData, ReportConfig)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportEngine for FakeEngine {
    async fn produce_report(
        &self,
        data: &TabularData,
        config: &ReportConfig,
    ) -> Result<Document, ProfilingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((data.clone(), config.clone()));
        match &self.response {
            Ok(html) => Ok(Document::new(html.clone())),
            Err(message) => Err(ProfilingError::new(message.clone())),
        }
    }
}

/// In-memory object storage that records, at each fetch, whether the job
/// store already held a PENDING record for the key.
pub struct ProbeStorage {
    inner: ObjectStoreBackend,
    store: Arc<dyn JobStore>,
    fetches: Mutex<Vec<(String, bool)>>,
    puts: AtomicUsize,
    fail_puts: AtomicBool,
}

impl ProbeStorage {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            inner: ObjectStoreBackend::in_memory(),
            store,
            fetches: Mutex::new(Vec::new()),
            puts: AtomicUsize::new(0),
            fail_puts: AtomicBool::new(false),
        }
    }

    /// Writes an object without counting it as a publish.
    pub async fn seed(&self, bucket: &str, key: &str, body: &str) {
        self.inner
            .put_new(bucket, key, Bytes::from(body.to_string()), "application/octet-stream")
            .await
            .unwrap();
    }

    pub async fn read(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.inner.get(bucket, key).await.ok()
    }

    /// `(key, pending_record_existed)` per fetch.
    pub fn fetches(&self) -> Vec<(String, bool)> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    async fn pending_record_exists(&self, key: &str) -> bool {
        let parts: Vec<&str> = key.split('/').collect();
        if parts.len() != 4 {
            return false;
        }
        self.store
            .list_for_owner(parts[1], Some(parts[2]))
            .await
            .unwrap_or_default()
            .iter()
            .any(|r| r.input_key == key && r.status == JobStatus::Pending)
    }
}

#[async_trait]
impl ObjectStorage for ProbeStorage {
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let pending = self.pending_record_exists(key).await;
        self.fetches.lock().unwrap().push((key.to_string(), pending));
        self.inner.get(bucket, key).await
    }

    async fn put_new(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Backend {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "simulated outage".to_string(),
            });
        }
        self.inner.put_new(bucket, key, body, content_type).await
    }
}

/// Job store whose writes always fail.
#[derive(Default)]
pub struct BrokenStore;

#[async_trait]
impl JobStore for BrokenStore {
    async fn create(&self, _record: &JobRecord) -> Result<(), StoreError> {
        Err(StoreError::Database(DatabaseError::LockPoisoned))
    }

    async fn finalize(
        &self,
        _id: &str,
        _completion: Completion,
        _completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Database(DatabaseError::LockPoisoned))
    }

    async fn get(&self, _id: &str) -> Result<Option<JobRecord>, StoreError> {
        Ok(None)
    }

    async fn list_for_owner(
        &self,
        _owner_id: &str,
        _group_id: Option<&str>,
    ) -> Result<Vec<JobRecord>, StoreError> {
        Ok(Vec::new())
    }
}

/// How [`FinalizeFaultStore`] refuses to finalize.
#[derive(Debug, Clone, Copy)]
pub enum FinalizeFault {
    /// The write cannot be committed.
    Database,
    /// The record is reported as already SUCCESS.
    AlreadyTerminal,
}

/// Memory store that creates and reads records normally but fails every
/// finalize.
pub struct FinalizeFaultStore {
    inner: MemoryJobStore,
    fault: FinalizeFault,
}

impl FinalizeFaultStore {
    pub fn new(fault: FinalizeFault) -> Self {
        Self {
            inner: MemoryJobStore::new(),
            fault,
        }
    }

    pub fn snapshot(&self) -> Vec<JobRecord> {
        self.inner.snapshot().unwrap()
    }
}

#[async_trait]
impl JobStore for FinalizeFaultStore {
    async fn create(&self, record: &JobRecord) -> Result<(), StoreError> {
        self.inner.create(record).await
    }

    async fn finalize(
        &self,
        id: &str,
        _completion: Completion,
        _completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        match self.fault {
            FinalizeFault::Database => Err(StoreError::Database(DatabaseError::LockPoisoned)),
            FinalizeFault::AlreadyTerminal => Err(StoreError::IllegalTransition {
                id: id.to_string(),
                current: JobStatus::Success,
            }),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<JobRecord>, StoreError> {
        self.inner.get(id).await
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<JobRecord>, StoreError> {
        self.inner.list_for_owner(owner_id, group_id).await
    }
}
