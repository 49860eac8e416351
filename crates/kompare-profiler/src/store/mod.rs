//! Job status records and the stores that hold them.
//!
//! A record is created PENDING and moves exactly once, through
//! [`JobStore::finalize`], to SUCCESS or FAILED.

pub mod memory;
pub mod model;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

pub use memory::MemoryJobStore;
pub use model::{Completion, JobRecord, JobStatus};
pub use sqlite::SqliteJobStore;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Inserts a new PENDING record. Fails with [`StoreError::Duplicate`]
    /// if the id exists.
    async fn create(&self, record: &JobRecord) -> Result<(), StoreError>;

    /// Compare-and-set from PENDING to the completion's status.
    ///
    /// Returns [`StoreError::IllegalTransition`] when the record is already
    /// terminal and [`StoreError::NotFound`] for an unknown id.
    async fn finalize(
        &self,
        id: &str,
        completion: Completion,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<Option<JobRecord>, StoreError>;

    /// Records for `owner_id`, optionally one group only, newest first.
    async fn list_for_owner(
        &self,
        owner_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<JobRecord>, StoreError>;
}
