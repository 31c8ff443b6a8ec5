//! Monitor configuration.
//!
//! Every setting has a built-in default; a TOML file may override any of
//! them and the binary applies its command line flags last.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for the temperature monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds to sleep between readings
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Timezone used for log timestamps and rotation boundaries
    #[serde(default)]
    pub timezone: Timezone,

    /// Sensor command: program followed by its arguments
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Seconds before a hung sensor command is killed (0 disables)
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

/// Timezone for timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timezone {
    #[default]
    Local,
    Utc,
}

/// How the active log file is replaced over time.
///
/// Exactly one policy is active for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RotationPolicy {
    /// A single active file, renamed to a dated backup at each boundary
    Timed(TimedRotation),
    /// One file per calendar date, never pruned
    Dated(DatedRotation),
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::Timed(TimedRotation::default())
    }
}

/// Settings for boundary-based rotation with bounded backups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedRotation {
    /// Directory holding the active file and its backups
    #[serde(default = "default_timed_directory")]
    pub directory: PathBuf,

    /// Name of the active log file
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// When the active file rolls over
    #[serde(default)]
    pub boundary: Boundary,

    /// Backups kept after a rollover (0 keeps all)
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
}

impl Default for TimedRotation {
    fn default() -> Self {
        Self {
            directory: default_timed_directory(),
            file_name: default_file_name(),
            boundary: Boundary::default(),
            backup_count: default_backup_count(),
        }
    }
}

/// Settings for one-file-per-date rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedRotation {
    /// Directory holding the per-date files
    #[serde(default = "default_dated_directory")]
    pub directory: PathBuf,

    /// File name prefix; the date and `.log` are appended
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for DatedRotation {
    fn default() -> Self {
        Self {
            directory: default_dated_directory(),
            prefix: default_prefix(),
        }
    }
}

/// Rollover boundary for timed rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    #[default]
    Midnight,
    Hourly,
}

// Default value functions
fn default_interval_secs() -> u64 {
    crate::DEFAULT_INTERVAL_SECS
}

fn default_command() -> Vec<String> {
    vec!["vcgencmd".to_string(), "measure_temp".to_string()]
}

fn default_command_timeout_secs() -> u64 {
    10
}

fn default_timed_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_name() -> String {
    "temp_log.log".to_string()
}

fn default_backup_count() -> usize {
    crate::DEFAULT_BACKUP_COUNT
}

fn default_dated_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_prefix() -> String {
    "temp_log".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timezone: Timezone::default(),
            command: default_command(),
            command_timeout_secs: default_command_timeout_secs(),
            rotation: RotationPolicy::default(),
        }
    }
}

impl MonitorConfig {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: MonitorConfig = toml::from_str(&content).map_err(|e| {
            MonitorError::config_error(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MonitorError::config_error(e.to_string()))
    }

    /// Checks settings that serde alone cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(MonitorError::config_error("interval_secs must be at least 1"));
        }
        if self.command.first().map_or(true, |program| program.is_empty()) {
            return Err(MonitorError::config_error("command must name a program"));
        }
        match &self.rotation {
            RotationPolicy::Timed(timed) => {
                if timed.file_name.is_empty() || timed.file_name.contains(&['/', '\\'][..]) {
                    return Err(MonitorError::config_error(format!(
                        "invalid log file name {:?}",
                        timed.file_name
                    )));
                }
            }
            RotationPolicy::Dated(dated) => {
                if dated.prefix.is_empty() || dated.prefix.contains(&['/', '\\'][..]) {
                    return Err(MonitorError::config_error(format!(
                        "invalid log file prefix {:?}",
                        dated.prefix
                    )));
                }
            }
        }
        Ok(())
    }

    /// Set the sampling interval in seconds.
    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    /// Set the timestamp timezone.
    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Set the sensor command.
    pub fn with_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }

    /// Set the rotation policy.
    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Point the active policy at a different log directory.
    pub fn with_log_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        match &mut self.rotation {
            RotationPolicy::Timed(timed) => timed.directory = directory,
            RotationPolicy::Dated(dated) => dated.directory = directory,
        }
        self
    }

    /// Sleep between iterations.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Sensor command timeout, if enabled.
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }
}
