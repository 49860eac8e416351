use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::key::JobIdentity;

const UNSPECIFIED_FAILURE: &str = "job failed without an error message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Success,
    Failed,
}

impl JobStatus {
    /// Persisted form.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Success => "SUCCESS",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(JobStatus::Pending),
            "SUCCESS" => Ok(JobStatus::Success),
            "FAILED" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

/// How a PENDING job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Succeeded,
    Failed(String),
}

impl Completion {
    pub fn status(&self) -> JobStatus {
        match self {
            Completion::Succeeded => JobStatus::Success,
            Completion::Failed(_) => JobStatus::Failed,
        }
    }

    /// Message to persist. Never empty for a failure.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Completion::Succeeded => None,
            Completion::Failed(message) if message.trim().is_empty() => Some(UNSPECIFIED_FAILURE),
            Completion::Failed(message) => Some(message),
        }
    }
}

/// Status record for one processing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub bucket: String,
    pub owner_id: String,
    pub group_id: String,
    pub input_key: String,
    pub output_key: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl JobRecord {
    /// A fresh PENDING record with a new random id.
    pub fn pending(
        bucket: &str,
        identity: &JobIdentity,
        input_key: &str,
        output_key: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            bucket: bucket.to_string(),
            owner_id: identity.owner_id.clone(),
            group_id: identity.group_id.clone(),
            input_key: input_key.to_string(),
            output_key,
            status: JobStatus::Pending,
            created_at,
            completed_at: None,
            error_message: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies `completion` to a PENDING record. `completed_at` is raised
    /// to `created_at` if earlier.
    pub(crate) fn complete(&mut self, completion: &Completion, completed_at: DateTime<Utc>) {
        self.status = completion.status();
        self.completed_at = Some(completed_at.max(self.created_at));
        self.error_message = completion.error_message().map(str::to_string);
    }
}

/// Current UTC time at the millisecond precision the store keeps.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Persisted timestamp form: RFC 3339, milliseconds, `Z` suffix.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
