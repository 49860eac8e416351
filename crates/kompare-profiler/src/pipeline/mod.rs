pub mod config;
pub mod context;
pub mod error;
pub mod runner;

pub use config::{FailurePolicy, PipelineConfig};
pub use context::JobContext;
pub use error::{AttemptError, BatchError, FailedJob};
pub use runner::{BatchOrchestrator, BatchReport, CompletedJob, SkippedKey};
