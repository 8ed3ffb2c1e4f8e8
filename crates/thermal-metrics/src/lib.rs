//! thermal-metrics — where node temperatures come from.
//!
//! A `ThermalSource` answers "how hot is node X right now?" with a live
//! `ThermalReading` or a `MetricError`. Nothing is cached and nothing is
//! retried here; retries and timeouts belong to the orchestrator.
//!
//! # Components
//!
//! - **`source`** — the `ThermalSource` trait
//! - **`client`** — `CustomMetricsClient`, reads the custom metrics API over HTTP
//! - **`credentials`** — API server address, bearer token and CA, loaded once
//! - **`payload`** — structured decode of `MetricValueList` responses
//! - **`quantity`** — resource quantity strings (`"45000m"`) to milli-units
//! - **`fixed`** — `FixedSource`, canned in-memory readings for tests

pub mod client;
pub mod credentials;
pub mod error;
pub mod fixed;
pub mod payload;
pub mod quantity;
pub mod source;

pub use client::CustomMetricsClient;
pub use credentials::ClusterCredentials;
pub use error::{MetricError, MetricResult};
pub use fixed::FixedSource;
pub use payload::parse_temperature;
pub use source::{FetchFuture, ThermalSource};
