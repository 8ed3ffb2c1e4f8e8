//! In-memory thermal source.
//!
//! Serves canned readings, failures and delays in place of the metrics
//! backend. Used throughout the test suites.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use thermal_core::ThermalReading;

use crate::error::{MetricError, MetricResult};
use crate::source::{FetchFuture, ThermalSource};

#[derive(Debug, Clone)]
enum Outcome {
    Celsius(f64),
    /// Transport failure (transient).
    FetchError,
    /// Payload that doesn't decode.
    ParseError(String),
    /// Fail transiently for the first `failures` calls, then report the temperature.
    Flaky { failures: u32, celsius: f64 },
}

#[derive(Debug, Clone)]
struct Entry {
    outcome: Outcome,
    delay: Duration,
}

/// A `ThermalSource` backed by a map of node → outcome.
///
/// Nodes without an entry answer with a 404 status error.
#[derive(Debug, Default)]
pub struct FixedSource {
    entries: HashMap<String, Entry>,
    calls: Mutex<HashMap<String, u32>>,
}

impl FixedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(node, °C)` pairs.
    pub fn from_readings<I, S>(readings: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        readings
            .into_iter()
            .fold(Self::new(), |source, (node, c)| source.with_celsius(node, c))
    }

    pub fn with_celsius(self, node: impl Into<String>, celsius: f64) -> Self {
        self.with(node, Outcome::Celsius(celsius), Duration::ZERO)
    }

    pub fn with_fetch_error(self, node: impl Into<String>) -> Self {
        self.with(node, Outcome::FetchError, Duration::ZERO)
    }

    pub fn with_parse_error(self, node: impl Into<String>, raw: impl Into<String>) -> Self {
        self.with(node, Outcome::ParseError(raw.into()), Duration::ZERO)
    }

    /// Report `celsius`, but only after `delay`.
    pub fn with_delayed(self, node: impl Into<String>, celsius: f64, delay: Duration) -> Self {
        self.with(node, Outcome::Celsius(celsius), delay)
    }

    /// Fail transiently for the first `failures` calls, then report `celsius`.
    pub fn with_flaky(self, node: impl Into<String>, failures: u32, celsius: f64) -> Self {
        self.with(node, Outcome::Flaky { failures, celsius }, Duration::ZERO)
    }

    fn with(mut self, node: impl Into<String>, outcome: Outcome, delay: Duration) -> Self {
        self.entries.insert(node.into(), Entry { outcome, delay });
        self
    }

    /// How many times `node` has been fetched.
    pub fn calls(&self, node: &str) -> u32 {
        self.calls
            .lock()
            .map(|calls| calls.get(node).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Record a call and return its 1-based attempt number.
    fn record_call(&self, node: &str) -> u32 {
        match self.calls.lock() {
            Ok(mut calls) => {
                let count = calls.entry(node.to_string()).or_insert(0);
                *count += 1;
                *count
            }
            Err(_) => 1,
        }
    }

    async fn answer(&self, node: &str) -> MetricResult<ThermalReading> {
        let attempt = self.record_call(node);

        let Some(entry) = self.entries.get(node) else {
            return Err(MetricError::Status {
                node: node.to_string(),
                status: 404,
                body: "no reading configured".to_string(),
            });
        };

        if !entry.delay.is_zero() {
            tokio::time::sleep(entry.delay).await;
        }

        match &entry.outcome {
            Outcome::Celsius(c) => Ok(ThermalReading::celsius(node, *c)),
            Outcome::FetchError => Err(MetricError::Fetch {
                node: node.to_string(),
                reason: "connection refused".to_string(),
            }),
            Outcome::ParseError(raw) => Err(MetricError::Parse {
                node: node.to_string(),
                raw: raw.clone(),
                reason: "unexpected payload".to_string(),
            }),
            Outcome::Flaky { failures, celsius } => {
                if attempt <= *failures {
                    Err(MetricError::Fetch {
                        node: node.to_string(),
                        reason: format!("flaky failure {attempt}/{failures}"),
                    })
                } else {
                    Ok(ThermalReading::celsius(node, *celsius))
                }
            }
        }
    }
}

impl ThermalSource for FixedSource {
    fn fetch<'a>(&'a self, node: &'a str) -> FetchFuture<'a> {
        Box::pin(self.answer(node))
    }
}
