//! Filter and priority decisions for a single node.

use thermal_core::config::PolicyConfig;
use thermal_core::{FilterVerdict, PriorityScore, Temperature, ThermalReading};

/// Hottest temperature (inclusive) that still admits a node.
pub const DEFAULT_MAX_TEMPERATURE_CELSIUS: f64 = 40.0;

/// Lower bound of the published score range.
pub const MIN_SCORE: PriorityScore = 0;

/// Upper bound of the published score range.
pub const MAX_SCORE: PriorityScore = 100;

/// Rejection reason for nodes above the threshold.
pub const TOO_HOT_REASON: &str = "Too hot";

/// Rejection reason for nodes without a usable reading.
pub const UNAVAILABLE_REASON: &str = "thermal metric unavailable";

/// Unclamped score: `100 − °C`, truncated toward zero.
pub fn raw_score(celsius: f64) -> PriorityScore {
    (100.0 - celsius) as PriorityScore
}

/// Threshold and score bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalPolicy {
    pub max_temperature_celsius: f64,
    pub min_score: PriorityScore,
    pub max_score: PriorityScore,
}

impl Default for ThermalPolicy {
    fn default() -> Self {
        Self {
            max_temperature_celsius: DEFAULT_MAX_TEMPERATURE_CELSIUS,
            min_score: MIN_SCORE,
            max_score: MAX_SCORE,
        }
    }
}

impl From<&PolicyConfig> for ThermalPolicy {
    fn from(config: &PolicyConfig) -> Self {
        Self {
            max_temperature_celsius: config.max_temperature_celsius,
            min_score: config.min_score,
            max_score: config.max_score,
        }
    }
}

impl ThermalPolicy {
    /// Admit the node if it is at or below the threshold.
    pub fn admit(&self, reading: &ThermalReading) -> FilterVerdict {
        match reading.temperature {
            Temperature::Celsius(c) if c <= self.max_temperature_celsius => FilterVerdict::Admitted,
            Temperature::Celsius(_) => FilterVerdict::Rejected(TOO_HOT_REASON.to_string()),
            Temperature::Unavailable(_) => {
                FilterVerdict::Rejected(UNAVAILABLE_REASON.to_string())
            }
        }
    }

    /// Rank the node; cooler nodes score higher.
    pub fn score(&self, reading: &ThermalReading) -> PriorityScore {
        match reading.temperature {
            Temperature::Celsius(c) => raw_score(c).clamp(self.min_score, self.max_score),
            Temperature::Unavailable(_) => self.min_score,
        }
    }
}
