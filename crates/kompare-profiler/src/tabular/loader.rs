use std::sync::Arc;

use tracing::debug;

use super::{ParserRegistry, TabularData};
use crate::error::LoadError;
use crate::storage::ObjectStorage;

/// Fetches an input object and parses it by extension.
pub struct TabularLoader {
    storage: Arc<dyn ObjectStorage>,
    parsers: ParserRegistry,
}

impl TabularLoader {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self::with_parsers(storage, ParserRegistry::new())
    }

    pub fn with_parsers(storage: Arc<dyn ObjectStorage>, parsers: ParserRegistry) -> Self {
        Self { storage, parsers }
    }

    pub async fn load(
        &self,
        bucket: &str,
        key: &str,
        extension: &str,
    ) -> Result<TabularData, LoadError> {
        let object = self
            .storage
            .get(bucket, key)
            .await
            .map_err(LoadError::Fetch)?;

        let data = self.parsers.parse(&object.body, extension)?;
        debug!(
            bytes = object.body.len(),
            columns = data.columns.len(),
            rows = data.row_count(),
            "Loaded tabular input"
        );
        Ok(data)
    }
}
