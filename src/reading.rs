//! A single temperature reading.

use crate::rotation::{format_celsius, format_line};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One temperature sample and the wall-clock time it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Temperature in degrees Celsius
    pub celsius: f64,
    /// Capture time in the configured timezone
    pub taken_at: NaiveDateTime,
}

impl Reading {
    pub fn new(celsius: f64, taken_at: NaiveDateTime) -> Self {
        Self { celsius, taken_at }
    }
}

impl fmt::Display for Reading {
    /// Renders the reading exactly as it appears in the log.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_line(self.taken_at, &format_celsius(self.celsius)))
    }
}
