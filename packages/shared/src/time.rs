//! Time-related utilities.

use chrono::{Local, TimeZone, Utc};

/// Get current Unix timestamp (milliseconds)
pub fn get_unix_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format Unix timestamp (milliseconds) as local wall-clock time (`HH:MM:SS`)
pub fn timestamp_to_local_clock(timestamp_millis: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}
