//! thermal-policy — pure thermal decisions.
//!
//! Turns a `ThermalReading` into a `FilterVerdict` (admit if at or below the
//! threshold) and a `PriorityScore` (`100 − °C`, clamped). No I/O, no state.
//!
//! A reading that is unavailable is never treated as cool: it is rejected
//! and gets the minimum score.

pub mod policy;

pub use policy::{
    DEFAULT_MAX_TEMPERATURE_CELSIUS, MAX_SCORE, MIN_SCORE, ThermalPolicy, TOO_HOT_REASON,
    UNAVAILABLE_REASON, raw_score,
};
