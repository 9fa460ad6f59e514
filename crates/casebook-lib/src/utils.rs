//! Time helpers shared by the aggregator and the records

use chrono::{DateTime, Local, Utc};

/// Format used for run-level begin/finish timestamps
pub const RUN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Round `value` to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Current Unix time in seconds, microsecond precision
pub fn unix_now() -> f64 {
    unix_seconds(Utc::now())
}

/// Unix seconds of `time`, microsecond precision
pub fn unix_seconds(time: DateTime<Utc>) -> f64 {
    round_to(time.timestamp_micros() as f64 / 1_000_000.0, 6)
}

/// Seconds between `start` and `end`, rounded to milliseconds
pub fn elapsed_secs(start: f64, end: f64) -> f64 {
    round_to(end - start, 3)
}

/// Local human-readable form of a run timestamp
pub fn format_local(time: &DateTime<Local>) -> String {
    time.format(RUN_TIME_FORMAT).to_string()
}
