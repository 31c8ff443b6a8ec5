//! File naming and backup retention for the rotation policies.

use crate::config::Boundary;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

impl Boundary {
    /// First boundary strictly after `t`.
    pub fn next_after(self, t: NaiveDateTime) -> NaiveDateTime {
        match self {
            Boundary::Midnight => t
                .date()
                .succ_opt()
                .map_or(NaiveDateTime::MAX, |day| day.and_time(NaiveTime::MIN)),
            Boundary::Hourly => {
                let hour = NaiveTime::from_hms_opt(t.hour(), 0, 0).unwrap_or_default();
                t.date().and_time(hour) + Duration::hours(1)
            }
        }
    }

    /// Length of one rotation period.
    pub fn period(self) -> Duration {
        match self {
            Boundary::Midnight => Duration::days(1),
            Boundary::Hourly => Duration::hours(1),
        }
    }

    /// Backup suffix for the period that ends at `rollover`.
    pub fn backup_suffix(self, rollover: NaiveDateTime) -> String {
        (rollover - self.period()).format(self.suffix_format()).to_string()
    }

    /// Whether `suffix` is one this boundary produces.
    pub fn is_backup_suffix(self, suffix: &str) -> bool {
        match self {
            Boundary::Midnight => {
                suffix.len() == 10 && NaiveDate::parse_from_str(suffix, "%Y-%m-%d").is_ok()
            }
            Boundary::Hourly => {
                suffix.len() == 13
                    && NaiveDateTime::parse_from_str(
                        &format!("{}:00:00", suffix),
                        "%Y-%m-%d_%H:%M:%S",
                    )
                    .is_ok()
            }
        }
    }

    /// Line written to a freshly rotated file.
    pub fn announcement(self) -> &'static str {
        match self {
            Boundary::Midnight => DAILY_ANNOUNCEMENT,
            Boundary::Hourly => "New log file started.",
        }
    }

    fn suffix_format(self) -> &'static str {
        match self {
            Boundary::Midnight => "%Y-%m-%d",
            Boundary::Hourly => "%Y-%m-%d_%H",
        }
    }
}

pub(crate) const DAILY_ANNOUNCEMENT: &str = "New log file started for new day.";

/// Path of the backup for `file_name` with the given suffix.
pub fn backup_path(directory: &Path, file_name: &str, suffix: &str) -> PathBuf {
    directory.join(format!("{}.{}", file_name, suffix))
}

/// Path of the per-date log file for `date`.
pub fn dated_path(directory: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    directory.join(format!("{}_{}.log", prefix, date.format("%Y-%m-%d")))
}

/// Backups of `file_name` in `directory`, oldest first.
pub fn list_backups(directory: &Path, file_name: &str, boundary: Boundary) -> io::Result<Vec<PathBuf>> {
    let stem = format!("{}.", file_name);
    let mut backups: Vec<(String, PathBuf)> = Vec::new();

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(suffix) = name.strip_prefix(&stem) {
            if boundary.is_backup_suffix(suffix) {
                backups.push((name, entry.path()));
            }
        }
    }

    // Suffixes are zero-padded ISO dates, so name order is age order
    backups.sort();
    Ok(backups.into_iter().map(|(_, path)| path).collect())
}

/// Delete the oldest backups beyond `keep`. `keep == 0` retains everything.
pub fn prune_backups(
    directory: &Path,
    file_name: &str,
    boundary: Boundary,
    keep: usize,
) -> io::Result<Vec<PathBuf>> {
    if keep == 0 {
        return Ok(Vec::new());
    }

    let backups = list_backups(directory, file_name, boundary)?;
    let excess = backups.len().saturating_sub(keep);
    let mut removed = Vec::with_capacity(excess);
    for path in backups.into_iter().take(excess) {
        fs::remove_file(&path)?;
        removed.push(path);
    }
    Ok(removed)
}
