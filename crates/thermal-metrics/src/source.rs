//! The seam between the orchestrator and whatever supplies temperatures.

use std::future::Future;
use std::pin::Pin;

use thermal_core::ThermalReading;

use crate::error::MetricResult;

/// Boxed future returned by [`ThermalSource::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = MetricResult<ThermalReading>> + Send + 'a>>;

/// Supplies live per-node temperatures.
///
/// Implementations are shared across concurrent requests, so they must be
/// safe to call from many tasks at once. A successful fetch always returns
/// an available reading; failures are reported as errors, never as a zero.
pub trait ThermalSource: Send + Sync {
    /// Read the current temperature of `node`. One attempt, no retries.
    fn fetch<'a>(&'a self, node: &'a str) -> FetchFuture<'a>;
}
