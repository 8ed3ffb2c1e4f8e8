//! Per-request fan-out over candidate nodes.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use thermal_core::config::DecisionConfig;
use thermal_core::{
    CandidateNode, ConfigResult, FilterResult, FilterVerdict, NodePriority, PriorityResult,
    SchedulingRequest, Temperature, ThermalReading, UnavailableCause,
};
use thermal_metrics::{MetricError, MetricResult, ThermalSource};
use thermal_policy::{TOO_HOT_REASON, ThermalPolicy};

use crate::error::{DecisionError, DecisionResult};
use crate::stats::DecisionStats;

/// Concurrency, timeout and retry bounds for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionLimits {
    /// Maximum in-flight fetches.
    pub concurrency: usize,
    /// Budget for one node, retries included.
    pub fetch_timeout: Duration,
    /// Budget for the whole request.
    pub request_timeout: Duration,
    pub max_retries: u32,
    /// Base delay between retries; doubles per attempt.
    pub retry_backoff: Duration,
}

impl Default for DecisionLimits {
    fn default() -> Self {
        Self {
            concurrency: 16,
            fetch_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            max_retries: 1,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl DecisionLimits {
    pub fn from_config(config: &DecisionConfig) -> ConfigResult<Self> {
        Ok(Self {
            concurrency: config.concurrency.max(1),
            fetch_timeout: config.fetch_timeout()?,
            request_timeout: config.request_timeout()?,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff()?,
        })
    }
}

/// Evaluates candidate nodes against the thermal policy.
///
/// Holds no per-request state; one instance serves every request.
pub struct Orchestrator {
    source: Arc<dyn ThermalSource>,
    policy: ThermalPolicy,
    limits: DecisionLimits,
    stats: Arc<DecisionStats>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn ThermalSource>, policy: ThermalPolicy, limits: DecisionLimits) -> Self {
        Self {
            source,
            policy,
            limits,
            stats: Arc::new(DecisionStats::new()),
        }
    }

    pub fn policy(&self) -> &ThermalPolicy {
        &self.policy
    }

    pub fn limits(&self) -> &DecisionLimits {
        &self.limits
    }

    pub fn stats(&self) -> &Arc<DecisionStats> {
        &self.stats
    }

    /// Admit or reject every candidate.
    pub async fn decide_filter(&self, request: &SchedulingRequest) -> DecisionResult<FilterResult> {
        self.stats.record_filter_request();
        let readings = self.read_all(&request.nodes).await?;

        let mut result = FilterResult::default();
        for (node, reading) in request.nodes.iter().zip(&readings) {
            match self.policy.admit(reading) {
                FilterVerdict::Admitted => result.admitted.push(node.clone()),
                FilterVerdict::Rejected(reason) => {
                    if reason == TOO_HOT_REASON {
                        self.stats.record_rejected_hot(1);
                    }
                    result.rejected.insert(node.name.clone(), reason);
                }
            }
        }
        self.stats.record_admitted(result.admitted.len() as u64);

        info!(
            nodes = request.nodes.len(),
            admitted = result.admitted.len(),
            rejected = result.rejected.len(),
            "filter decided"
        );
        Ok(result)
    }

    /// Score every candidate, in input order.
    pub async fn decide_priority(
        &self,
        request: &SchedulingRequest,
    ) -> DecisionResult<PriorityResult> {
        self.stats.record_prioritize_request();
        let readings = self.read_all(&request.nodes).await?;

        let priorities: Vec<NodePriority> = request
            .nodes
            .iter()
            .zip(&readings)
            .map(|(node, reading)| NodePriority {
                node: node.name.clone(),
                score: self.policy.score(reading),
            })
            .collect();

        info!(nodes = priorities.len(), "priorities decided");
        Ok(PriorityResult { priorities })
    }

    /// One reading per node, in input order, under the request deadline.
    pub async fn read_all(&self, nodes: &[CandidateNode]) -> DecisionResult<Vec<ThermalReading>> {
        let fetches: Vec<_> = nodes.iter().map(|node| self.read_one(&node.name)).collect();
        let fan_out = stream::iter(fetches)
            .buffered(self.limits.concurrency.max(1))
            .collect::<Vec<_>>();

        match tokio::time::timeout(self.limits.request_timeout, fan_out).await {
            Ok(readings) => Ok(readings),
            Err(_) => {
                self.stats.record_orchestration_timeout();
                warn!(
                    nodes = nodes.len(),
                    deadline_ms = self.limits.request_timeout.as_millis() as u64,
                    "thermal evaluation hit the request deadline"
                );
                Err(DecisionError::OrchestrationTimeout {
                    nodes: nodes.len(),
                    deadline: self.limits.request_timeout,
                })
            }
        }
    }

    /// Read one node. Every failure folds into an unavailable reading.
    async fn read_one(&self, node: &str) -> ThermalReading {
        let outcome = tokio::time::timeout(self.limits.fetch_timeout, self.fetch_with_retry(node)).await;

        let reading = match outcome {
            Ok(Ok(reading)) => ThermalReading {
                node: node.to_string(),
                temperature: reading.temperature,
            },
            Ok(Err(err)) => {
                match &err {
                    MetricError::Parse { .. } => {
                        warn!(%node, error = %err, "thermal metric payload did not decode");
                    }
                    _ => debug!(%node, error = %err, "thermal metric unavailable"),
                }
                ThermalReading::unavailable(node, err.cause())
            }
            Err(_) => {
                debug!(
                    %node,
                    timeout_ms = self.limits.fetch_timeout.as_millis() as u64,
                    "thermal metric fetch timed out"
                );
                ThermalReading::unavailable(node, UnavailableCause::Timeout)
            }
        };

        if let Temperature::Unavailable(cause) = reading.temperature {
            self.stats.record_unavailable(cause);
        }
        reading
    }

    async fn fetch_with_retry(&self, node: &str) -> MetricResult<ThermalReading> {
        let mut attempt = 0u32;
        loop {
            match self.source.fetch(node).await {
                Ok(reading) => return Ok(reading),
                Err(err) if err.is_transient() && attempt < self.limits.max_retries => {
                    attempt += 1;
                    let backoff = self
                        .limits
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempt - 1));
                    debug!(
                        %node,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "retrying thermal metric fetch"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
