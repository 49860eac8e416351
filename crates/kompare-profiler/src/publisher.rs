//! Report publishing: deterministic output keys and create-only writes.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use crate::error::PublishError;
use crate::key::JobIdentity;
use crate::report::Document;
use crate::storage::ObjectStorage;

pub const REPORT_CONTENT_TYPE: &str = "text/html";

/// `{output_prefix}{owner}/{group}/{base_name}-{created_at_millis}.html`
pub fn output_key(output_prefix: &str, identity: &JobIdentity, created_at_millis: i64) -> String {
    format!(
        "{}{}/{}/{}-{}.html",
        output_prefix, identity.owner_id, identity.group_id, identity.base_name, created_at_millis
    )
}

pub struct ArtifactPublisher {
    storage: Arc<dyn ObjectStorage>,
}

impl ArtifactPublisher {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Writes `document` at `key`. An existing object is never replaced.
    pub async fn publish(
        &self,
        bucket: &str,
        key: &str,
        document: Document,
        content_type: &str,
    ) -> Result<(), PublishError> {
        let body = Bytes::from(document.into_bytes());
        let size = body.len();

        self.storage
            .put_new(bucket, key, body, content_type)
            .await
            .map_err(|source| PublishError {
                key: key.to_string(),
                source,
            })?;

        info!(bytes = size, "Published report");
        Ok(())
    }
}
