//! Log target management and rotation.
//!
//! The [`LogTargetManager`] owns the one open [`LogTarget`], mirrors every
//! line to the console, and swaps the target when the configured
//! [`RotationPolicy`] says the current one is finished.

pub mod format;
pub mod policy;
pub mod target;

pub use format::{format_celsius, format_line, TIMESTAMP_FORMAT};
pub use target::LogTarget;

use crate::config::{DatedRotation, RotationPolicy, TimedRotation, Timezone};
use crate::error::Result;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

/// When the current target expires.
#[derive(Debug, Clone, Copy)]
enum Expiry {
    At(NaiveDateTime),
    AfterDate(NaiveDate),
}

/// Owns the active log target and the console mirror.
pub struct LogTargetManager {
    policy: RotationPolicy,
    target: LogTarget,
    expiry: Expiry,
    console: Box<dyn Write + Send>,
}

impl LogTargetManager {
    /// Open the first target for `policy`, mirroring lines to stdout.
    pub fn open(rotation: RotationPolicy, timezone: Timezone, now: NaiveDateTime) -> Result<Self> {
        Self::with_console(rotation, timezone, now, Box::new(io::stdout()))
    }

    /// Open the first target for `policy` with a custom console sink.
    ///
    /// Failing to open the first file is an error; later rotations degrade
    /// to console-only output instead.
    pub fn with_console(
        rotation: RotationPolicy,
        timezone: Timezone,
        now: NaiveDateTime,
        console: Box<dyn Write + Send>,
    ) -> Result<Self> {
        let (target, expiry) = match &rotation {
            RotationPolicy::Timed(timed) => {
                fs::create_dir_all(&timed.directory)?;
                let path = timed.directory.join(&timed.file_name);
                // An existing file rolls over relative to its last write
                let base = modified_at(&path, timezone).map_or(now, |mtime| mtime.min(now));
                let target = LogTarget::open(path)?;
                (target, Expiry::At(timed.boundary.next_after(base)))
            }
            RotationPolicy::Dated(dated) => {
                fs::create_dir_all(&dated.directory)?;
                let date = now.date();
                let path = policy::dated_path(&dated.directory, &dated.prefix, date);
                let target = LogTarget::open(path)?;
                (target, Expiry::AfterDate(date))
            }
        };

        tracing::info!("Logging to {}", target.path().display());
        Ok(Self {
            policy: rotation,
            target,
            expiry,
            console,
        })
    }

    /// The target currently receiving lines.
    pub fn current_target(&self) -> &LogTarget {
        &self.target
    }

    /// Write `<timestamp> - <payload>` to the file and the console.
    ///
    /// The target is rotated first if `at` falls past its expiry, so no line
    /// lands in a file belonging to an earlier period. The console always
    /// receives the line; an error means only the file sink failed.
    pub fn write(&mut self, at: NaiveDateTime, payload: &str) -> Result<()> {
        self.rotate_if_needed(at);
        self.emit(at, payload)
    }

    /// Write a temperature reading.
    pub fn write_reading(&mut self, at: NaiveDateTime, celsius: f64) -> Result<()> {
        self.write(at, &format_celsius(celsius))
    }

    /// Swap the target if the policy says the current one has expired.
    ///
    /// Returns `true` when a new target was opened. Failures while renaming,
    /// pruning or opening are logged; the loop keeps going with whatever
    /// sinks remain.
    pub fn rotate_if_needed(&mut self, now: NaiveDateTime) -> bool {
        let due = match self.expiry {
            Expiry::At(rollover) => now >= rollover,
            Expiry::AfterDate(date) => now.date() != date,
        };
        if !due {
            return false;
        }

        let current = self.policy.clone();
        let announcement = match (&current, self.expiry) {
            (RotationPolicy::Timed(timed), Expiry::At(rollover)) => {
                self.rotate_timed(timed, rollover, now);
                timed.boundary.announcement()
            }
            (RotationPolicy::Dated(dated), Expiry::AfterDate(_)) => {
                self.rotate_dated(dated, now);
                policy::DAILY_ANNOUNCEMENT
            }
            _ => return false,
        };

        tracing::info!("Rotated log to {}", self.target.path().display());
        if let Err(e) = self.emit(now, announcement) {
            tracing::warn!("{}", e);
        }
        true
    }

    /// Flush and release the active file.
    pub fn close(&mut self) {
        self.target.close();
    }

    fn emit(&mut self, at: NaiveDateTime, payload: &str) -> Result<()> {
        let line = format_line(at, payload);
        let file_result = self.target.write_line(&line);
        if let Err(e) = writeln!(self.console, "{}", line).and_then(|_| self.console.flush()) {
            tracing::debug!("Console write failed: {}", e);
        }
        file_result
    }

    fn rotate_timed(&mut self, timed: &TimedRotation, rollover: NaiveDateTime, now: NaiveDateTime) {
        self.target.close();

        let active = timed.directory.join(&timed.file_name);
        let backup = policy::backup_path(
            &timed.directory,
            &timed.file_name,
            &timed.boundary.backup_suffix(rollover),
        );
        if let Err(e) = roll_over(&active, &backup) {
            tracing::error!(
                "Failed to move {} to {}: {}",
                active.display(),
                backup.display(),
                e
            );
        }

        match policy::prune_backups(&timed.directory, &timed.file_name, timed.boundary, timed.backup_count) {
            Ok(removed) => {
                for path in removed {
                    tracing::info!("Removed old log {}", path.display());
                }
            }
            Err(e) => tracing::error!("Failed to prune old logs: {}", e),
        }

        self.target = open_or_detach(&active);
        self.expiry = Expiry::At(timed.boundary.next_after(now));
    }

    fn rotate_dated(&mut self, dated: &DatedRotation, now: NaiveDateTime) {
        self.target.close();

        let date = now.date();
        if let Err(e) = fs::create_dir_all(&dated.directory) {
            tracing::error!("Failed to create {}: {}", dated.directory.display(), e);
        }
        let path = policy::dated_path(&dated.directory, &dated.prefix, date);
        self.target = open_or_detach(&path);
        self.expiry = Expiry::AfterDate(date);
    }
}

impl Drop for LogTargetManager {
    fn drop(&mut self) {
        self.target.close();
    }
}

impl std::fmt::Debug for LogTargetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogTargetManager")
            .field("policy", &self.policy)
            .field("target", &self.target)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

fn roll_over(active: &Path, backup: &Path) -> io::Result<()> {
    if !active.exists() {
        return Ok(());
    }
    if backup.exists() {
        fs::remove_file(backup)?;
    }
    fs::rename(active, backup)
}

fn open_or_detach(path: &Path) -> LogTarget {
    LogTarget::open(path).unwrap_or_else(|e| {
        tracing::error!(
            "Failed to open {}: {}; continuing on console only",
            path.display(),
            e
        );
        LogTarget::detached(path)
    })
}

fn modified_at(path: &Path, timezone: Timezone) -> Option<NaiveDateTime> {
    let mtime: SystemTime = fs::metadata(path).ok()?.modified().ok()?;
    Some(match timezone {
        Timezone::Local => DateTime::<Local>::from(mtime).naive_local(),
        Timezone::Utc => DateTime::<Utc>::from(mtime).naive_utc(),
    })
}
