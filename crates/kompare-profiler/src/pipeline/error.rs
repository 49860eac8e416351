use thiserror::Error;

use crate::error::{LoadError, ProfilingError, PublishError, StoreError};
use crate::store::JobStatus;

use super::runner::BatchReport;

/// A failure inside one job attempt. Its message is what gets persisted.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Profiling(#[from] ProfilingError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// A job that ended FAILED while the batch kept going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedJob {
    pub job_id: String,
    pub input_key: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to create job record for '{key}': {source}")]
    CreateRecord {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to finalize job '{job_id}': {source}")]
    Finalize {
        job_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Job '{job_id}' is already {current}; status left unchanged")]
    IllegalTransition { job_id: String, current: JobStatus },

    #[error("Job '{job_id}' for '{input_key}' failed: {source}")]
    JobFailed {
        job_id: String,
        input_key: String,
        #[source]
        source: AttemptError,
    },

    #[error("{} job(s) in the batch failed", .failures.len())]
    JobsFailed {
        failures: Vec<FailedJob>,
        /// Everything that did complete or was skipped.
        report: BatchReport,
    },
}
