//! Test harness wiring a `BatchOrchestrator` to test doubles.

#![allow(dead_code)]

use std::sync::Arc;

use kompare_profiler::event::NotificationBatch;
use kompare_profiler::pipeline::{
    BatchError, BatchOrchestrator, BatchReport, FailurePolicy, PipelineConfig,
};
use kompare_profiler::storage::StoredObject;
use kompare_profiler::store::{JobRecord, JobStore, MemoryJobStore};

use super::fakes::{FakeEngine, ProbeStorage, DEFAULT_HTML};

pub const BUCKET: &str = "b";

pub struct TestHarness<S: JobStore + 'static = MemoryJobStore> {
    pub store: Arc<S>,
    pub storage: Arc<ProbeStorage>,
    pub engine: Arc<FakeEngine>,
    orchestrator: BatchOrchestrator,
}

impl TestHarness<MemoryJobStore> {
    /// Memory store, engine returning [`DEFAULT_HTML`], default config.
    pub fn new() -> Self {
        Self::build(
            MemoryJobStore::new(),
            FakeEngine::html(DEFAULT_HTML),
            PipelineConfig::default(),
        )
    }

    pub fn with_engine(engine: FakeEngine) -> Self {
        Self::build(MemoryJobStore::new(), engine, PipelineConfig::default())
    }

    pub fn with_policy(policy: FailurePolicy) -> Self {
        let config = PipelineConfig {
            failure_policy: policy,
            ..PipelineConfig::default()
        };
        Self::build(MemoryJobStore::new(), FakeEngine::html(DEFAULT_HTML), config)
    }

    /// Every record in creation order.
    pub fn all_records(&self) -> Vec<JobRecord> {
        self.store.snapshot().unwrap()
    }
}

impl<S: JobStore + 'static> TestHarness<S> {
    pub fn build(store: S, engine: FakeEngine, config: PipelineConfig) -> Self {
        let store = Arc::new(store);
        let engine = Arc::new(engine);
        let storage = Arc::new(ProbeStorage::new(store.clone()));
        let orchestrator = BatchOrchestrator::new(
            Arc::new(config),
            store.clone(),
            storage.clone(),
            engine.clone(),
        );

        Self {
            store,
            storage,
            engine,
            orchestrator,
        }
    }

    pub async fn upload(&self, key: &str, body: &str) {
        self.storage.seed(BUCKET, key, body).await;
    }

    pub async fn run(&self, batch: &NotificationBatch) -> Result<BatchReport, BatchError> {
        self.orchestrator.run_batch(batch).await
    }

    pub async fn run_keys(&self, keys: &[&str]) -> Result<BatchReport, BatchError> {
        let records = keys
            .iter()
            .map(|key| kompare_profiler::event::NotificationRecord::new(BUCKET, *key))
            .collect();
        self.run(&NotificationBatch::new(records)).await
    }

    pub async fn records(&self, owner: &str, group: &str) -> Vec<JobRecord> {
        self.store.list_for_owner(owner, Some(group)).await.unwrap()
    }

    pub async fn artifact(&self, key: &str) -> Option<StoredObject> {
        self.storage.read(BUCKET, key).await
    }
}
