use chrono::{DateTime, TimeZone, Utc};
use eyre::{eyre, Result};

/// milliseconds since UNIX epoch
pub fn datetime_to_millis(d: &DateTime<Utc>) -> i64 {
    d.timestamp_millis()
}

/// From milliseconds since UNIX epoch
pub fn datetime_from_millis(unix_millis: i64) -> Result<DateTime<Utc>> {
    match Utc.timestamp_millis_opt(unix_millis) {
        chrono::LocalResult::Single(dt) => Ok(dt),
        _ => Err(eyre!(
            "error converting unix millis epoch to DateTime: {}",
            unix_millis
        )),
    }
}
