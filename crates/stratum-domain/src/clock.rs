use std::time::{SystemTime, UNIX_EPOCH};

/// Current timestamp in seconds since the Unix epoch
///
/// A clock set before 1970 yields 0 rather than failing.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
