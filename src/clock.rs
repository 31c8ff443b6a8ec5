//! Wall-clock time in the configured timezone.

use crate::config::Timezone;
use chrono::{Local, NaiveDateTime, Utc};

/// Source of the current wall-clock time.
///
/// All timestamps in this crate are naive date-times already shifted into
/// the configured timezone, so rotation boundaries and log timestamps agree.
pub trait Clock {
    /// Current wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Timezone,
}

impl SystemClock {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.timezone {
            Timezone::Local => Local::now().naive_local(),
            Timezone::Utc => Utc::now().naive_utc(),
        }
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
