//! Profiling job orchestrator.
//!
//! Turns tabular uploads in object storage into HTML profiling reports:
//! each accepted upload gets a status record that moves from PENDING to
//! SUCCESS or FAILED exactly once.

pub mod config;
pub mod db;
pub mod error;
pub mod event;
pub mod key;
pub mod logging;
pub mod pipeline;
pub mod publisher;
pub mod report;
pub mod sanitize;
pub mod storage;
pub mod store;
pub mod tabular;

pub use config::{load_config, load_config_from_str, ProfilerConfig};
pub use error::{
    ConfigError, FormatError, KeyRejected, LoadError, ProfilerError, ProfilingError, PublishError,
    Result, StorageError, StoreError,
};
pub use event::{NotificationBatch, NotificationRecord};
pub use key::{decode_notification_key, parse_key, JobIdentity};
pub use pipeline::{BatchError, BatchOrchestrator, BatchReport, FailurePolicy, PipelineConfig};
pub use publisher::{output_key, ArtifactPublisher, REPORT_CONTENT_TYPE};
pub use report::{CommandReportEngine, Document, ReportConfig, ReportEngine, ReportMode};
pub use storage::{ObjectStorage, ObjectStoreBackend, StoredObject};
pub use store::{Completion, JobRecord, JobStatus, JobStore, MemoryJobStore, SqliteJobStore};
pub use tabular::{TabularData, TabularLoader};
