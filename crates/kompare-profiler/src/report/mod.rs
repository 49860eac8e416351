//! The external report engine: tabular data in, a self-contained HTML
//! document out.

pub mod command;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProfilingError;
use crate::tabular::TabularData;

pub use command::CommandReportEngine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Full analysis, including correlations and interactions.
    Explorative,
    /// Summary statistics only.
    #[default]
    Minimal,
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Explorative => f.write_str("explorative"),
            ReportMode::Minimal => f.write_str("minimal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub mode: ReportMode,
}

fn default_title() -> String {
    "Profiling Report".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            mode: ReportMode::default(),
        }
    }
}

/// A rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub html: String,
}

impl Document {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn len(&self) -> usize {
        self.html.len()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.html.into_bytes()
    }
}

#[async_trait]
pub trait ReportEngine: Send + Sync {
    /// Renders one report. Called once per job, never retried.
    async fn produce_report(
        &self,
        data: &TabularData,
        config: &ReportConfig,
    ) -> Result<Document, ProfilingError>;
}
