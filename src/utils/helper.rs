use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in seconds since epoch
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
