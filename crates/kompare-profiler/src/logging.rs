//! Logging, powered by tracing-subscriber.
//!
//! `tracing_log::LogTracer` forwards `log::*` calls into the same
//! subscriber so they carry the current span context.

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::ProfilerError;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line text: timestamp LEVEL target - message.
    #[default]
    Compact,
    /// JSON lines with span fields.
    Json,
}

/// `RUST_LOG` wins over the configured level when set.
fn build_env_filter(level: &str) -> Result<EnvFilter, ProfilerError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = vec![level.to_string()];
    // Quieten HTTP client internals pulled in by the S3 backend.
    for (target, lvl) in [("hyper", "warn"), ("reqwest", "warn"), ("object_store", "info")] {
        directives.push(format!("{}={}", target, lvl));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| ProfilerError::Logging(format!("invalid filter '{}': {}", filter_str, e)))
}

/// Installs the global subscriber writing to stderr.
///
/// Fails if a global subscriber or `log` logger is already installed.
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), ProfilerError> {
    let filter = build_env_filter(level)?;

    let layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_span_list(true)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(layer.with_filter(filter));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ProfilerError::Logging(e.to_string()))?;
    tracing_log::LogTracer::init().map_err(|e| ProfilerError::Logging(e.to_string()))?;

    tracing::debug!(level, ?format, "Logging initialized");
    Ok(())
}
