pub mod clipboard_item;
pub mod device;

/// Timestamps are stored as epoch milliseconds. Millisecond resolution is
/// what keeps per-user creation order usable as the sole ordering key.
pub fn millis(ts: chrono::DateTime<chrono::Utc>) -> i64 {
    ts.timestamp_millis()
}

pub fn from_millis(ms: i64) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp_millis(ms)
}
