//! Inbound notification batches.

use serde::{Deserialize, Serialize};

/// One storage-change notification: an object that appeared in a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub bucket: String,
    /// Key as delivered by the notification (still URL-encoded).
    pub key: String,
}

impl NotificationRecord {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Ordered set of notifications handled by one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationBatch {
    pub records: Vec<NotificationRecord>,
}

impl NotificationBatch {
    pub fn new(records: Vec<NotificationRecord>) -> Self {
        Self { records }
    }

    /// A batch holding exactly one record, as built by the local entry point.
    pub fn single(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(vec![NotificationRecord::new(bucket, key)])
    }

    /// Parses the storage service's event document
    /// (`{"Records":[{"s3":{"bucket":{"name":..},"object":{"key":..}}}]}`).
    pub fn from_storage_event_json(json: &str) -> Result<Self, serde_json::Error> {
        let event: StorageEvent = serde_json::from_str(json)?;
        let records = event
            .records
            .into_iter()
            .map(|r| NotificationRecord::new(r.s3.bucket.name, r.s3.object.key))
            .collect();
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Deserialize)]
struct StorageEvent {
    #[serde(rename = "Records", default)]
    records: Vec<StorageEventRecord>,
}

#[derive(Deserialize)]
struct StorageEventRecord {
    s3: StorageEntity,
}

#[derive(Deserialize)]
struct StorageEntity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Deserialize)]
struct ObjectEntity {
    key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_storage_event() {
        let json = r#"{
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "uploads", "arn": "arn:aws:s3:::uploads" },
                        "object": { "key": "INPUT/u1/f1/data.csv", "size": 12 }
                    }
                },
                {
                    "s3": {
                        "bucket": { "name": "uploads" },
                        "object": { "key": "INPUT/u2/f9/rows+2.json" }
                    }
                }
            ]
        }"#;

        let batch = NotificationBatch::from_storage_event_json(json).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.records[0],
            NotificationRecord::new("uploads", "INPUT/u1/f1/data.csv")
        );
        // Keys are kept encoded; decoding happens in the key parser.
        assert_eq!(batch.records[1].key, "INPUT/u2/f9/rows+2.json");
    }

    #[test]
    fn test_event_without_records_is_empty_batch() {
        let batch = NotificationBatch::from_storage_event_json("{}").unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_event_missing_key_is_error() {
        let json = r#"{"Records":[{"s3":{"bucket":{"name":"b"},"object":{}}}]}"#;
        assert!(NotificationBatch::from_storage_event_json(json).is_err());
    }

    #[test]
    fn test_single_record_batch() {
        let batch = NotificationBatch::single("b", "INPUT/u1/f1/data.csv");
        assert_eq!(batch.records, vec![NotificationRecord::new("b", "INPUT/u1/f1/data.csv")]);
    }
}
