use std::fmt;

use chrono::{DateTime, Utc};

use super::util::datetime_to_millis;

/// Name of an uploaded file as it is persisted:
/// `<upload timestamp in ms>-<sanitized original basename>`.
///
/// The timestamp prefix makes names unique per millisecond and encodes the
/// upload order without any separate index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredFileName(String);

impl StoredFileName {
    pub fn new(uploaded_at: &DateTime<Utc>, original_name: &str) -> StoredFileName {
        StoredFileName(format!(
            "{}-{}",
            datetime_to_millis(uploaded_at),
            sanitize_basename(original_name)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn timestamp(&self) -> Option<i64> {
        parse_timestamp(&self.0)
    }
}

impl fmt::Display for StoredFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoredFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Keeps only the last path component of a client supplied file name and
/// replaces everything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_basename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let sanitized: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        String::from("upload")
    } else {
        sanitized
    }
}

/// Upload timestamp encoded in the text before the first `-`.
/// `None` if that segment is not a plain decimal number.
pub fn parse_timestamp(file_name: &str) -> Option<i64> {
    let prefix = file_name.split('-').next()?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid filename: {0:?}")]
pub struct InvalidFileName(pub String);

/// Checks that a file name received from a client names a single object
/// directly inside a storage directory.
pub fn validate_file_name(name: &str) -> Result<&str, InvalidFileName> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        Err(InvalidFileName(name.to_owned()))
    } else {
        Ok(name)
    }
}
