//! Local entry point: runs one batch against S3 with a SQLite status table.
//!
//! ```text
//! profile-local <bucket> <key>
//! profile-local --event <event.json>
//! ```
//!
//! The config file is read from `$KOMPARE_PROFILER_CONFIG` when set.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use kompare_profiler::config::{load_config, ProfilerConfig};
use kompare_profiler::logging::init_logging;
use kompare_profiler::{
    BatchOrchestrator, BatchReport, CommandReportEngine, ConfigError, NotificationBatch,
    ObjectStoreBackend, PipelineConfig, ProfilerError, SqliteJobStore,
};

const CONFIG_ENV: &str = "KOMPARE_PROFILER_CONFIG";
const USAGE: &str = "usage: profile-local <bucket> <key>\n       profile-local --event <event.json>";

enum Invocation {
    Single { bucket: String, key: String },
    Event(PathBuf),
}

fn parse_args(args: &[String]) -> Option<Invocation> {
    match args {
        [flag, path] if flag == "--event" => Some(Invocation::Event(PathBuf::from(path))),
        [bucket, key] if !bucket.starts_with('-') => Some(Invocation::Single {
            bucket: bucket.clone(),
            key: key.clone(),
        }),
        _ => None,
    }
}

fn load() -> Result<ProfilerConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_config(PathBuf::from(path)),
        None => Ok(ProfilerConfig::default()),
    }
}

async fn run(config: ProfilerConfig, invocation: Invocation) -> kompare_profiler::Result<BatchReport> {
    let batch = match invocation {
        Invocation::Single { bucket, key } => NotificationBatch::single(bucket, key),
        Invocation::Event(path) => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ProfilerError::ReadEvent { path, source })?;
            NotificationBatch::from_storage_event_json(&json)?
        }
    };

    let db_path = config
        .resolved_database_path()
        .ok_or_else(|| ConfigError::Validation {
            message: "no home directory; set databasePath".to_string(),
        })?;
    let store = SqliteJobStore::open(&db_path, &config.status_table_name)?;
    let engine = CommandReportEngine::new(config.engine.program.clone(), config.engine.args.clone());

    let orchestrator = BatchOrchestrator::new(
        Arc::new(PipelineConfig::from_config(&config)),
        Arc::new(store),
        Arc::new(ObjectStoreBackend::amazon_s3()),
        Arc::new(engine),
    );

    Ok(orchestrator.run_batch(&batch).await?)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(invocation) = parse_args(&args) else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    let config = match load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("profile-local: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging.level, config.logging.format) {
        eprintln!("profile-local: {}", e);
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config, invocation)) {
        Ok(report) => {
            for job in &report.completed {
                println!("{}\t{}", job.job_id, job.output_key);
            }
            for skipped in &report.skipped {
                println!("skipped\t{}\t{}", skipped.key, skipped.reason.reason());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Batch failed");
            ExitCode::FAILURE
        }
    }
}
