//! Metric provider error types.

use thiserror::Error;

use thermal_core::UnavailableCause;

/// Errors from reading a node's temperature.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("invalid node name: {0:?}")]
    InvalidNode(String),

    #[error("metric fetch failed for node {node}: {reason}")]
    Fetch { node: String, reason: String },

    #[error("metrics backend returned {status} for node {node}: {body}")]
    Status {
        node: String,
        status: u16,
        body: String,
    },

    #[error("unparseable metric payload for node {node}: {reason} (payload: {raw})")]
    Parse {
        node: String,
        raw: String,
        reason: String,
    },

    #[error("metrics client setup failed: {0}")]
    Setup(String),
}

impl MetricError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MetricError::Fetch { .. } => true,
            MetricError::Status { status, .. } => *status >= 500 || *status == 429,
            MetricError::InvalidNode(_) | MetricError::Parse { .. } | MetricError::Setup(_) => {
                false
            }
        }
    }

    /// How the failure shows up on the resulting unavailable reading.
    pub fn cause(&self) -> UnavailableCause {
        match self {
            MetricError::Parse { .. } => UnavailableCause::Parse,
            _ => UnavailableCause::Fetch,
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;
