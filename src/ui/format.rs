use chrono::{DateTime, Utc};

/// Formats an activity timestamp for list display, e.g. `Oct 01 12:40:00`.
pub fn date_long(epoch_second: i64) -> String {
    match DateTime::<Utc>::from_timestamp(epoch_second, 0) {
        Some(datetime) => datetime.format("%b %d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// Formats an activity timestamp as time of day only, e.g. `13:05:30`.
pub fn date_short(epoch_second: i64) -> String {
    match DateTime::<Utc>::from_timestamp(epoch_second, 0) {
        Some(datetime) => datetime.format("%H:%M:%S").to_string(),
        None => String::new(),
    }
}
