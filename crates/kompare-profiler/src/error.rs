use std::path::PathBuf;
use thiserror::Error;

use crate::store::JobStatus;

#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Job store error: {0}")]
    Store(#[from] StoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Batch failed: {0}")]
    Batch(#[from] crate::pipeline::BatchError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Invalid notification event: {0}")]
    Event(#[from] serde_json::Error),

    #[error("Failed to read event file '{path}': {source}")]
    ReadEvent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Why a storage key was not accepted as a job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyRejected {
    #[error("key does not start with input prefix '{prefix}'")]
    WrongPrefix { prefix: String },

    #[error("expected <owner>/<group>/<file> after the prefix, found {segments} segment(s)")]
    MalformedPath { segments: usize },

    #[error("key is not valid percent-encoded UTF-8")]
    UndecodableKey,
}

impl KeyRejected {
    /// Stable short reason, used in logs and batch reports.
    pub fn reason(&self) -> &'static str {
        match self {
            KeyRejected::WrongPrefix { .. } => "wrong-prefix",
            KeyRejected::MalformedPath { .. } => "malformed-path",
            KeyRejected::UndecodableKey => "undecodable-key",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("malformed delimited data: {0}")]
    Delimited(String),

    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("input is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("expected array of objects: {0}")]
    ExpectedArrayOfObjects(String),

    #[error("no parser registered for {0} input")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to fetch input: {0}")]
    Fetch(#[source] StorageError),

    #[error("failed to parse input: {0}")]
    Format(#[from] FormatError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Object already exists: {bucket}/{key}")]
    AlreadyExists { bucket: String, key: String },

    #[error("Object storage request for {bucket}/{key} failed: {message}")]
    Backend {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to open bucket '{bucket}': {message}")]
    Configuration { bucket: String, message: String },

    #[error("Storage registry lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Job record '{id}' already exists")]
    Duplicate { id: String },

    #[error("Job record '{id}' not found")]
    NotFound { id: String },

    #[error("Illegal transition for job '{id}': status is already {current}")]
    IllegalTransition { id: String, current: JobStatus },

    #[error("Stored job record '{id}' is unreadable: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Job store lock poisoned")]
    LockPoisoned,
}

/// Failure reported by the external report engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("report engine failed: {message}")]
pub struct ProfilingError {
    pub message: String,
}

impl ProfilingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
#[error("failed to publish report to '{key}': {source}")]
pub struct PublishError {
    pub key: String,
    #[source]
    pub source: StorageError,
}

pub type Result<T> = std::result::Result<T, ProfilerError>;
