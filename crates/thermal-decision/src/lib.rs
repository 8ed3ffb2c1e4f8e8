//! thermal-decision — turns a batch of candidate nodes into filter and
//! priority results.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator
//!   ├── read_all() → bounded fan-out over ThermalSource (input order kept)
//!   │   ├── per-fetch timeout + retry of transient errors
//!   │   └── failures become Unavailable readings, never request errors
//!   ├── decide_filter()   → ThermalPolicy::admit per node → FilterResult
//!   ├── decide_priority() → ThermalPolicy::score per node → PriorityResult
//!   └── DecisionStats (counters, Prometheus text)
//! ```
//!
//! The whole fan-out runs under a request deadline; exceeding it fails the
//! request with `OrchestrationTimeout` instead of returning partial results.

pub mod error;
pub mod orchestrator;
pub mod prometheus;
pub mod stats;

pub use error::{DecisionError, DecisionResult};
pub use orchestrator::{DecisionLimits, Orchestrator};
pub use prometheus::render_prometheus;
pub use stats::{DecisionStats, StatsSnapshot};
