//! Parsing of `vcgencmd measure_temp` output.

use crate::error::{MonitorError, Result};

const PREFIX: &str = "temp=";
const SUFFIX: &str = "'C";

/// Parse the sensor command output into degrees Celsius.
///
/// The expected form is `temp=<number>'C`. Anything else falls back to
/// joining every digit, `.` and `-` in the output, in order, and parsing
/// that.
pub fn parse_reading(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MonitorError::sample_read("sensor command produced no output"));
    }

    let number = match raw.strip_prefix(PREFIX).and_then(|s| s.strip_suffix(SUFFIX)) {
        Some(inner) => inner.to_string(),
        None => raw
            .chars()
            .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
            .collect(),
    };

    if number.is_empty() {
        return Err(MonitorError::sample_read(format!(
            "no temperature value in {:?}",
            raw
        )));
    }

    match number.parse::<f64>() {
        Ok(celsius) if celsius.is_finite() => Ok(celsius),
        _ => Err(MonitorError::sample_read(format!(
            "malformed temperature {:?} in {:?}",
            number, raw
        ))),
    }
}
