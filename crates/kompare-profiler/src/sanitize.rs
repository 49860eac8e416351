//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Object keys embed owner and group ids; spans carry only the file name
//! and a hash of the full key for correlation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Returns the last `/` segment of an object key.
///
/// Safe for span fields: reveals the file name without the owning path.
pub fn redact_key(key: &str) -> String {
    match key.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "<unknown>".to_string(),
    }
}

/// Returns a short deterministic hash of a key for correlation without
/// exposing the key itself.
pub fn hash_key(key: &str) -> String {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();
    format!("{:016x}", hash)
}
