use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::db::default_database_path;
use crate::logging::LogFormat;
use crate::pipeline::FailurePolicy;
use crate::report::ReportConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilerConfig {
    /// Keys outside this prefix are ignored.
    #[serde(default = "default_input_prefix")]
    pub input_prefix: String,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    #[serde(default = "default_status_table_name")]
    pub status_table_name: String,
    /// SQLite file; `~/.kompare/data/profiling.db` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_input_prefix() -> String {
    "INPUT/".to_string()
}

fn default_output_prefix() -> String {
    "REPORTS/".to_string()
}

fn default_status_table_name() -> String {
    "db-kompare-profiling-dev".to_string()
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            input_prefix: default_input_prefix(),
            output_prefix: default_output_prefix(),
            status_table_name: default_status_table_name(),
            database_path: None,
            report: ReportConfig::default(),
            failure_policy: FailurePolicy::default(),
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ProfilerConfig {
    /// Configured database file, falling back to the per-user default.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        self.database_path.clone().or_else(default_database_path)
    }
}

/// External report program for the command engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_engine_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_engine_program() -> String {
    "kompare-report".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: default_engine_program(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
