//! Storage-key parsing: turns `{prefix}{owner}/{group}/{file}` into a job identity.

use percent_encoding::percent_decode_str;

use crate::error::KeyRejected;

/// Identity of a job, derived entirely from the input object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobIdentity {
    pub owner_id: String,
    pub group_id: String,
    /// Last path segment, unchanged.
    pub file_name: String,
    /// File name with its last extension removed; used for output naming.
    pub base_name: String,
    /// Extension without the dot. Empty when the file name has none.
    pub extension: String,
}

/// Decodes a key as delivered in a storage notification (`+` for space,
/// `%XX` escapes).
pub fn decode_notification_key(raw: &str) -> Result<String, KeyRejected> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| KeyRejected::UndecodableKey)
}

/// Parses a decoded object key into a [`JobIdentity`].
///
/// The key must start with `input_prefix` and the remainder must be exactly
/// three non-empty `/`-separated segments.
pub fn parse_key(key: &str, input_prefix: &str) -> Result<JobIdentity, KeyRejected> {
    let rest = key
        .strip_prefix(input_prefix)
        .ok_or_else(|| KeyRejected::WrongPrefix {
            prefix: input_prefix.to_string(),
        })?;

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(KeyRejected::MalformedPath {
            segments: segments.iter().filter(|s| !s.is_empty()).count(),
        });
    }

    let file_name = segments[2];
    let (base_name, extension) = split_extension(file_name);

    Ok(JobIdentity {
        owner_id: segments[0].to_string(),
        group_id: segments[1].to_string(),
        file_name: file_name.to_string(),
        base_name: base_name.to_string(),
        extension: extension.to_string(),
    })
}

/// `data.v2.csv` -> (`data.v2`, `csv`); `README` -> (`README`, ``).
/// A trailing dot is not an extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() => (base, ext),
        _ => (file_name, ""),
    }
}
