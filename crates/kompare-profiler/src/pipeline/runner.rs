use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, info_span, warn, Instrument};

use crate::error::{KeyRejected, StoreError};
use crate::event::{NotificationBatch, NotificationRecord};
use crate::key::{self, JobIdentity};
use crate::publisher::{self, ArtifactPublisher, REPORT_CONTENT_TYPE};
use crate::report::ReportEngine;
use crate::sanitize;
use crate::storage::ObjectStorage;
use crate::store::model::now_millis;
use crate::store::{Completion, JobRecord, JobStore};
use crate::tabular::TabularLoader;

use super::config::{FailurePolicy, PipelineConfig};
use super::context::JobContext;
use super::error::{AttemptError, BatchError, FailedJob};

/// A job that reached SUCCESS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    pub job_id: String,
    pub input_key: String,
    pub output_key: String,
}

/// A notification that was not turned into a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedKey {
    pub bucket: String,
    pub key: String,
    pub reason: KeyRejected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: Vec<CompletedJob>,
    pub skipped: Vec<SkippedKey>,
}

/// Drives each notification of a batch through create, load, profile,
/// publish and finalize, one record at a time.
pub struct BatchOrchestrator {
    config: Arc<PipelineConfig>,
    store: Arc<dyn JobStore>,
    loader: TabularLoader,
    engine: Arc<dyn ReportEngine>,
    publisher: ArtifactPublisher,
}

impl BatchOrchestrator {
    pub fn new(
        config: Arc<PipelineConfig>,
        store: Arc<dyn JobStore>,
        storage: Arc<dyn ObjectStorage>,
        engine: Arc<dyn ReportEngine>,
    ) -> Self {
        Self {
            config,
            store,
            loader: TabularLoader::new(Arc::clone(&storage)),
            engine,
            publisher: ArtifactPublisher::new(storage),
        }
    }

    /// Processes the batch in order.
    ///
    /// Rejected keys are skipped. A failed job is persisted as FAILED and
    /// then either ends the batch or, under [`FailurePolicy::Continue`], is
    /// collected into [`BatchError::JobsFailed`]. Store failures always end
    /// the batch.
    pub async fn run_batch(&self, batch: &NotificationBatch) -> Result<BatchReport, BatchError> {
        let span = info_span!("batch", records = batch.len());
        async move {
            let mut report = BatchReport::default();
            let mut failures = Vec::new();

            for record in &batch.records {
                let (input_key, identity) = match self.accept(record) {
                    Ok(accepted) => accepted,
                    Err(reason) => {
                        warn!(
                            file = %sanitize::redact_key(&record.key),
                            key_hash = %sanitize::hash_key(&record.key),
                            reason = reason.reason(),
                            "Skipping notification: {}",
                            reason
                        );
                        report.skipped.push(SkippedKey {
                            bucket: record.bucket.clone(),
                            key: record.key.clone(),
                            reason,
                        });
                        continue;
                    }
                };

                match self.run_job(&record.bucket, input_key, identity).await {
                    Ok(completed) => report.completed.push(completed),
                    Err(BatchError::JobFailed {
                        job_id,
                        input_key,
                        source,
                    }) if self.config.failure_policy == FailurePolicy::Continue => {
                        failures.push(FailedJob {
                            job_id,
                            input_key,
                            message: source.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }

            info!(
                completed = report.completed.len(),
                skipped = report.skipped.len(),
                failed = failures.len(),
                "Batch finished"
            );

            if failures.is_empty() {
                Ok(report)
            } else {
                Err(BatchError::JobsFailed { failures, report })
            }
        }
        .instrument(span)
        .await
    }

    fn accept(&self, record: &NotificationRecord) -> Result<(String, JobIdentity), KeyRejected> {
        let decoded = key::decode_notification_key(&record.key)?;
        let identity = key::parse_key(&decoded, &self.config.input_prefix)?;
        Ok((decoded, identity))
    }

    async fn run_job(
        &self,
        bucket: &str,
        input_key: String,
        identity: JobIdentity,
    ) -> Result<CompletedJob, BatchError> {
        let created_at = now_millis();
        let output_key = publisher::output_key(
            &self.config.output_prefix,
            &identity,
            created_at.timestamp_millis(),
        );
        let record = JobRecord::pending(bucket, &identity, &input_key, output_key, created_at);

        let span = info_span!("job",
            job_id = %record.id,
            bucket = %bucket,
            file = %sanitize::redact_key(&input_key),
            key_hash = %sanitize::hash_key(&input_key),
        );

        async move {
            self.store
                .create(&record)
                .await
                .map_err(|source| BatchError::CreateRecord {
                    key: input_key.clone(),
                    source,
                })?;
            info!(output = %sanitize::redact_key(&record.output_key), "Created PENDING job record");

            let ctx = JobContext::new(identity, record);
            let outcome = self.attempt(&ctx).await;
            let completed_at = now_millis().max(ctx.record.created_at);

            match outcome {
                Ok(()) => {
                    self.finalize(ctx.job_id(), Completion::Succeeded, completed_at)
                        .await?;
                    info!("Job succeeded");
                    Ok(CompletedJob {
                        job_id: ctx.record.id,
                        input_key: ctx.record.input_key,
                        output_key: ctx.record.output_key,
                    })
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(error = %message, "Job failed");
                    self.finalize(ctx.job_id(), Completion::Failed(message), completed_at)
                        .await?;
                    Err(BatchError::JobFailed {
                        job_id: ctx.record.id,
                        input_key: ctx.record.input_key,
                        source: e,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Load, profile, publish. The first failure ends the attempt.
    async fn attempt(&self, ctx: &JobContext) -> Result<(), AttemptError> {
        let data = self
            .loader
            .load(ctx.bucket(), ctx.input_key(), &ctx.identity.extension)
            .instrument(info_span!("load", extension = %ctx.identity.extension))
            .await?;

        let document = self
            .engine
            .produce_report(&data, &self.config.report)
            .instrument(info_span!("profile", rows = data.row_count()))
            .await?;
        drop(data);

        self.publisher
            .publish(ctx.bucket(), ctx.output_key(), document, REPORT_CONTENT_TYPE)
            .instrument(info_span!("publish"))
            .await?;

        Ok(())
    }

    async fn finalize(
        &self,
        job_id: &str,
        completion: Completion,
        completed_at: DateTime<Utc>,
    ) -> Result<(), BatchError> {
        let status = completion.status();
        match self.store.finalize(job_id, completion, completed_at).await {
            Ok(()) => Ok(()),
            Err(StoreError::IllegalTransition { id, current }) => {
                error!(
                    job_id = %id,
                    %current,
                    attempted = %status,
                    "Job record is already terminal"
                );
                Err(BatchError::IllegalTransition {
                    job_id: id,
                    current,
                })
            }
            Err(source) => {
                error!(job_id, attempted = %status, error = %source, "Failed to finalize job record");
                Err(BatchError::Finalize {
                    job_id: job_id.to_string(),
                    source,
                })
            }
        }
    }
}
