//! Orchestrator error types.

use std::time::Duration;

use thiserror::Error;

/// Request-level failures. Per-node failures never show up here.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("thermal evaluation of {nodes} nodes did not finish within {deadline:?}")]
    OrchestrationTimeout { nodes: usize, deadline: Duration },
}

pub type DecisionResult<T> = Result<T, DecisionError>;
