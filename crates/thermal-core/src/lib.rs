//! thermal-core — shared types for the thermal scheduler extender.
//!
//! - **`types`** — decision model (candidates, readings, verdicts, results)
//! - **`extender`** — scheduler-extender wire types (`ExtenderArgs` and friends)
//! - **`config`** — `thermal.toml` parsing and validation
//! - **`duration`** — human duration strings (`"500ms"`, `"2s"`, `"1m"`)

pub mod config;
pub mod duration;
pub mod error;
pub mod extender;
pub mod types;

pub use config::ExtenderConfig;
pub use duration::parse_duration;
pub use error::{ConfigError, ConfigResult};
pub use types::*;
