//! The active log destination.

use crate::error::{MonitorError, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The log file currently receiving lines.
///
/// The file handle is dropped when the sink breaks; the target then only
/// remembers where it was supposed to write.
#[derive(Debug)]
pub struct LogTarget {
    path: PathBuf,
    file: Option<File>,
}

impl LogTarget {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// A target whose file could not be opened. Writes go nowhere.
    pub(crate) fn detached(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file sink is still accepting lines.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Append one line to the file.
    ///
    /// A failed write reopens the file and retries once. If the retry also
    /// fails the file sink is disabled and the error returned.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        let record = format!("{}\n", line);
        let first = match file.write_all(record.as_bytes()) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        tracing::warn!(
            "Write to {} failed ({}), reopening",
            self.path.display(),
            first
        );
        self.file = None;

        let reopened = open_append(&self.path).and_then(|mut file| {
            file.write_all(record.as_bytes())?;
            Ok(file)
        });
        match reopened {
            Ok(file) => {
                self.file = Some(file);
                Ok(())
            }
            Err(e) => Err(MonitorError::write(&self.path, e)),
        }
    }

    /// Flush and release the file handle.
    pub fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush().and_then(|_| file.sync_data()) {
                tracing::debug!("Flushing {} on close: {}", self.path.display(), e);
            }
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
