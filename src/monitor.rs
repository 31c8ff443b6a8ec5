//! The sampling loop.
//!
//! [`Monitor`] ties a [`Sampler`] to a [`LogTargetManager`]: every interval it
//! checks for rotation, takes a reading and logs it, until the shutdown
//! future completes.

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::reading::Reading;
use crate::rotation::LogTargetManager;
use crate::sampler::Sampler;
use std::future::Future;
use std::io::{self, Write};
use tokio::time;
use tracing::{debug, info, warn};

/// Line written when monitoring stops.
pub const SHUTDOWN_MESSAGE: &str = "Monitoring stopped by user.";

/// Lifecycle of a [`Monitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

/// Counters for one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Loop iterations executed
    pub iterations: u64,
    /// Readings taken and logged
    pub readings: u64,
    /// Iterations skipped because the sensor could not be read
    pub sample_failures: u64,
    /// Times the log target was rotated
    pub rotations: u64,
}

/// Periodic temperature logger.
pub struct Monitor<S, C = SystemClock> {
    config: MonitorConfig,
    sampler: S,
    clock: C,
    console: Option<Box<dyn Write + Send>>,
    state: MonitorState,
}

impl<S: Sampler> Monitor<S, SystemClock> {
    /// Create a monitor using the system clock in the configured timezone.
    pub fn new(config: MonitorConfig, sampler: S) -> Self {
        let clock = SystemClock::new(config.timezone);
        Self::with_clock(config, sampler, clock)
    }
}

impl<S: Sampler, C: Clock> Monitor<S, C> {
    /// Create a monitor with an explicit clock.
    pub fn with_clock(config: MonitorConfig, sampler: S, clock: C) -> Self {
        Self {
            config,
            sampler,
            clock,
            console: None,
            state: MonitorState::Idle,
        }
    }

    /// Mirror log lines to `console` instead of stdout.
    pub fn with_console(mut self, console: Box<dyn Write + Send>) -> Self {
        self.console = Some(console);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Take one reading without touching the log.
    pub async fn read_once(&mut self) -> Result<Reading> {
        let taken_at = self.clock.now();
        let celsius = self.sampler.sample().await?;
        Ok(Reading::new(celsius, taken_at))
    }

    /// Run the loop until `shutdown` completes.
    ///
    /// A failed reading skips that iteration; it never ends the loop. The
    /// shutdown request is honoured while sampling or sleeping, and the last
    /// line written is [`SHUTDOWN_MESSAGE`].
    pub async fn run<F>(&mut self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        if self.state != MonitorState::Idle {
            return Err(MonitorError::config_error("monitor has already been started"));
        }
        self.config.validate()?;

        let console = self
            .console
            .take()
            .unwrap_or_else(|| Box::new(io::stdout()));
        let mut logs = LogTargetManager::with_console(
            self.config.rotation.clone(),
            self.config.timezone,
            self.clock.now(),
            console,
        )?;
        self.state = MonitorState::Running;

        let interval = self.config.interval();
        let mut summary = RunSummary::default();

        let now = self.clock.now();
        if logs.rotate_if_needed(now) {
            summary.rotations += 1;
        }
        let started = format!(
            "Starting temperature monitoring every {} seconds.",
            self.config.interval_secs
        );
        if let Err(e) = logs.write(now, &started) {
            warn!("{}", e);
        }
        info!("Monitor running with {}s interval", self.config.interval_secs);

        tokio::pin!(shutdown);

        loop {
            let now = self.clock.now();
            if logs.rotate_if_needed(now) {
                summary.rotations += 1;
            }

            summary.iterations += 1;
            let sampled = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                result = self.sampler.sample() => result,
            };
            match sampled {
                Ok(celsius) => {
                    summary.readings += 1;
                    if let Err(e) = logs.write_reading(now, celsius) {
                        warn!("{}", e);
                    }
                }
                Err(e) => {
                    summary.sample_failures += 1;
                    warn!("Skipping reading: {}", e);
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = time::sleep(interval) => {}
            }
        }

        info!("Shutting down after {} iterations", summary.iterations);
        let now = self.clock.now();
        if logs.rotate_if_needed(now) {
            summary.rotations += 1;
        }
        if let Err(e) = logs.write(now, SHUTDOWN_MESSAGE) {
            warn!("{}", e);
        }
        logs.close();
        self.state = MonitorState::Stopped;
        debug!("{:?}", summary);

        Ok(summary)
    }
}
