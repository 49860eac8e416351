use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Completion, JobRecord, JobStore};
use crate::error::StoreError;

/// [`JobStore`] held in process memory. Same transition rules as the
/// SQLite store; used by tests and offline runs.
#[derive(Default)]
pub struct MemoryJobStore {
    records: Mutex<HashMap<String, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record, oldest first.
    pub fn snapshot(&self) -> Result<Vec<JobRecord>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut all: Vec<JobRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, record: &JobRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate {
                id: record.id.clone(),
            });
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn finalize(
        &self,
        id: &str,
        completion: Completion,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if record.is_terminal() {
            return Err(StoreError::IllegalTransition {
                id: id.to_string(),
                current: record.status,
            });
        }

        record.complete(&completion, completed_at);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<JobRecord>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<JobRecord>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut matching: Vec<JobRecord> = records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .filter(|r| group_id.map_or(true, |g| r.group_id == g))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(matching)
    }
}
