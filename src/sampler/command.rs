//! Sampler backed by an external measurement command.

use crate::error::{MonitorError, Result};
use crate::sampler::{parse::parse_reading, traits::Sampler};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time;

/// Runs a command such as `vcgencmd measure_temp` for every reading.
#[derive(Debug, Clone)]
pub struct CommandSampler {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandSampler {
    /// Create a sampler from a program and its arguments.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Create a sampler from a full command line (program first).
    pub fn from_command(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| MonitorError::config_error("empty sensor command"))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    /// Kill the command if it has not finished after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the command and return its standard output.
    async fn run_command(&self) -> Result<String> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MonitorError::sample_read(format!("failed to run {}: {}", self.program, e)))?;

        let output = match self.timeout {
            Some(limit) => time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    MonitorError::sample_read(format!(
                        "{} did not finish within {}s",
                        self.program,
                        limit.as_secs()
                    ))
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| MonitorError::sample_read(format!("failed to read {} output: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MonitorError::sample_read(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for CommandSampler {
    fn default() -> Self {
        Self::new("vcgencmd", vec!["measure_temp".to_string()])
    }
}

impl Sampler for CommandSampler {
    async fn sample(&mut self) -> Result<f64> {
        let raw = self.run_command().await?;
        tracing::debug!("{} output: {:?}", self.program, raw.trim());
        parse_reading(&raw)
    }
}
