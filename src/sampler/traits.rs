//! Traits for temperature sampling.

use crate::error::Result;

/// Trait for reading a single temperature value.
///
/// Implementations return degrees Celsius. A failed read is reported as
/// [`MonitorError::SampleRead`](crate::error::MonitorError::SampleRead) and
/// is never retried here; the caller decides whether to skip or stop.
pub trait Sampler {
    /// Take one reading.
    fn sample(&mut self) -> impl std::future::Future<Output = Result<f64>> + Send;
}
