use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{format_timestamp, parse_timestamp};
use super::{Completion, JobRecord, JobStatus, JobStore};
use crate::db::job_repo::{self, JobRow};
use crate::db::Database;
use crate::error::StoreError;

/// Durable [`JobStore`] over one SQLite status table.
#[derive(Clone)]
pub struct SqliteJobStore {
    db: Database,
    table: String,
}

impl SqliteJobStore {
    /// Opens the database file and migrates `table`.
    pub fn open(path: &Path, table: &str) -> Result<Self, StoreError> {
        let db = Database::open(path, table)?;
        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    pub fn open_in_memory(table: &str) -> Result<Self, StoreError> {
        let db = Database::open_in_memory(table)?;
        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn to_row(record: &JobRecord) -> JobRow {
    JobRow {
        id: record.id.clone(),
        bucket: record.bucket.clone(),
        owner_id: record.owner_id.clone(),
        group_id: record.group_id.clone(),
        input_key: record.input_key.clone(),
        output_key: record.output_key.clone(),
        status: record.status.as_str().to_string(),
        created_at: format_timestamp(record.created_at),
        completed_at: record.completed_at.map(format_timestamp),
        error_message: record.error_message.clone(),
    }
}

fn from_row(row: JobRow) -> Result<JobRecord, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        id: row.id.clone(),
        reason,
    };

    let status = row.status.parse::<JobStatus>().map_err(corrupt)?;
    let created_at = parse_timestamp(&row.created_at)
        .map_err(|e| corrupt(format!("created_at '{}': {}", row.created_at, e)))?;
    let completed_at = match row.completed_at.as_deref() {
        Some(text) => Some(
            parse_timestamp(text).map_err(|e| corrupt(format!("completed_at '{}': {}", text, e)))?,
        ),
        None => None,
    };

    Ok(JobRecord {
        id: row.id,
        bucket: row.bucket,
        owner_id: row.owner_id,
        group_id: row.group_id,
        input_key: row.input_key,
        output_key: row.output_key,
        status,
        created_at,
        completed_at,
        error_message: row.error_message,
    })
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn create(&self, record: &JobRecord) -> Result<(), StoreError> {
        job_repo::insert(&self.db, &self.table, &to_row(record)).map_err(|e| {
            if e.is_primary_key_violation() {
                StoreError::Duplicate {
                    id: record.id.clone(),
                }
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn finalize(
        &self,
        id: &str,
        completion: Completion,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let changed = job_repo::finalize_pending(
            &self.db,
            &self.table,
            id,
            completion.status().as_str(),
            &format_timestamp(completed_at),
            completion.error_message(),
        )?;
        if changed > 0 {
            return Ok(());
        }

        // Nothing matched: tell an unknown id apart from a terminal record.
        match job_repo::find_by_id(&self.db, &self.table, id)? {
            None => Err(StoreError::NotFound { id: id.to_string() }),
            Some(row) => {
                let current = from_row(row)?.status;
                if current.is_terminal() {
                    Err(StoreError::IllegalTransition {
                        id: id.to_string(),
                        current,
                    })
                } else {
                    Err(StoreError::Corrupt {
                        id: id.to_string(),
                        reason: "conditional finalize matched no row".to_string(),
                    })
                }
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<JobRecord>, StoreError> {
        job_repo::find_by_id(&self.db, &self.table, id)?
            .map(from_row)
            .transpose()
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<JobRecord>, StoreError> {
        job_repo::query_by_owner(&self.db, &self.table, owner_id, group_id)?
            .into_iter()
            .map(from_row)
            .collect()
    }
}
