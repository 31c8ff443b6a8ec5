//! Temperature sampling.
//!
//! This module reads the SoC temperature by running the firmware's
//! measurement command and turning its `temp=48.2'C` output into a Celsius
//! value. The [`Sampler`] trait keeps the loop independent of how the value
//! is obtained.

pub mod command;
pub mod parse;
pub mod traits;

// Re-export commonly used items
pub use command::CommandSampler;
pub use parse::parse_reading;
pub use traits::Sampler;
