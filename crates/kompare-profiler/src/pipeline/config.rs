use serde::{Deserialize, Serialize};

use crate::config::ProfilerConfig;
use crate::report::ReportConfig;

/// What to do with the rest of a batch once a job has failed.
///
/// Either way the failed job is recorded as FAILED before anything else
/// happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop at the first failed job and return its error.
    #[default]
    AbortBatch,
    /// Process every record, then report all failed jobs together.
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input_prefix: String,
    pub output_prefix: String,
    pub report: ReportConfig,
    pub failure_policy: FailurePolicy,
}

impl PipelineConfig {
    pub fn from_config(config: &ProfilerConfig) -> Self {
        Self {
            input_prefix: config.input_prefix.clone(),
            output_prefix: config.output_prefix.clone(),
            report: config.report.clone(),
            failure_policy: config.failure_policy,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&ProfilerConfig::default())
    }
}
