//! Log line formatting.

use chrono::NaiveDateTime;

/// Timestamp layout for every log line: second precision, no zone.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a line as `<timestamp> - <payload>`.
pub fn format_line(at: NaiveDateTime, payload: &str) -> String {
    format!("{} - {}", at.format(TIMESTAMP_FORMAT), payload)
}

/// Format a temperature as `48.20°C`.
pub fn format_celsius(celsius: f64) -> String {
    format!("{:.2}°C", celsius)
}
