use crate::key::JobIdentity;
use crate::store::JobRecord;

/// One accepted notification, from record creation to finalize.
pub struct JobContext {
    pub identity: JobIdentity,
    /// As created; the store holds the live status.
    pub record: JobRecord,
}

impl JobContext {
    pub fn new(identity: JobIdentity, record: JobRecord) -> Self {
        Self { identity, record }
    }

    pub fn job_id(&self) -> &str {
        &self.record.id
    }

    pub fn bucket(&self) -> &str {
        &self.record.bucket
    }

    pub fn input_key(&self) -> &str {
        &self.record.input_key
    }

    pub fn output_key(&self) -> &str {
        &self.record.output_key
    }
}
