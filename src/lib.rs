//! # pi_thermolog - Raspberry Pi Temperature Logger
//!
//! Samples the SoC temperature through `vcgencmd measure_temp` on a fixed
//! interval and appends one line per reading to a rotating log file, with
//! every line mirrored to the console.
//!
//! ## Features
//!
//! - **Pluggable sampling**: the [`Sampler`] trait hides how a reading is taken
//! - **Two rotation policies**: midnight/hourly rollover with bounded
//!   backups, or one file per calendar date
//! - **Graceful shutdown**: the loop stops on any future you hand it,
//!   typically a signal
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pi_thermolog::{CommandSampler, Monitor, MonitorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MonitorConfig::default();
//!     let sampler = CommandSampler::from_command(&config.command)?;
//!     let mut monitor = Monitor::new(config, sampler);
//!
//!     // Log until Ctrl-C
//!     monitor.run(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod monitor;
pub mod reading;
pub mod rotation;
pub mod sampler;

// Re-export public API
pub use clock::{Clock, SystemClock};
pub use config::{Boundary, DatedRotation, MonitorConfig, RotationPolicy, TimedRotation, Timezone};
pub use error::{MonitorError, Result};
pub use monitor::{Monitor, MonitorState, RunSummary, SHUTDOWN_MESSAGE};
pub use reading::Reading;
pub use rotation::{LogTarget, LogTargetManager};
pub use sampler::{parse_reading, CommandSampler, Sampler};

/// The default sampling interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// The default number of rotated log files kept
pub const DEFAULT_BACKUP_COUNT: usize = 7;
