//! Error handling for the pi_thermolog crate.

use std::path::PathBuf;

/// A specialized `Result` type for pi_thermolog operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// The main error type for temperature monitoring operations.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sensor command failed or its output could not be parsed
    #[error("Failed to read temperature: {0}")]
    SampleRead(String),

    /// The log file could not be written, even after reopening it
    #[error("Failed to write log file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MonitorError {
    /// Create a new sample read error
    pub fn sample_read(msg: impl Into<String>) -> Self {
        Self::SampleRead(msg.into())
    }

    /// Create a new write error for the given log file
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
