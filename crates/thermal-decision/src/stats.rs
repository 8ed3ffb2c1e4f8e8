//! Decision counters.
//!
//! Lock-free atomics shared by every request; read as a snapshot for the
//! `/metrics` endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use thermal_core::UnavailableCause;

#[derive(Debug, Default)]
pub struct DecisionStats {
    filter_requests: AtomicU64,
    prioritize_requests: AtomicU64,
    nodes_admitted: AtomicU64,
    nodes_rejected_hot: AtomicU64,
    unavailable_fetch: AtomicU64,
    unavailable_parse: AtomicU64,
    unavailable_timeout: AtomicU64,
    orchestration_timeouts: AtomicU64,
    malformed_requests: AtomicU64,
}

/// Point-in-time copy of [`DecisionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub filter_requests: u64,
    pub prioritize_requests: u64,
    pub nodes_admitted: u64,
    pub nodes_rejected_hot: u64,
    pub unavailable_fetch: u64,
    pub unavailable_parse: u64,
    pub unavailable_timeout: u64,
    pub orchestration_timeouts: u64,
    pub malformed_requests: u64,
}

impl DecisionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_filter_request(&self) {
        self.filter_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prioritize_request(&self) {
        self.prioritize_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_admitted(&self, count: u64) {
        self.nodes_admitted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_rejected_hot(&self, count: u64) {
        self.nodes_rejected_hot.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_unavailable(&self, cause: UnavailableCause) {
        let counter = match cause {
            UnavailableCause::Fetch => &self.unavailable_fetch,
            UnavailableCause::Parse => &self.unavailable_parse,
            UnavailableCause::Timeout => &self.unavailable_timeout,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_orchestration_timeout(&self) {
        self.orchestration_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed_request(&self) {
        self.malformed_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            filter_requests: self.filter_requests.load(Ordering::Relaxed),
            prioritize_requests: self.prioritize_requests.load(Ordering::Relaxed),
            nodes_admitted: self.nodes_admitted.load(Ordering::Relaxed),
            nodes_rejected_hot: self.nodes_rejected_hot.load(Ordering::Relaxed),
            unavailable_fetch: self.unavailable_fetch.load(Ordering::Relaxed),
            unavailable_parse: self.unavailable_parse.load(Ordering::Relaxed),
            unavailable_timeout: self.unavailable_timeout.load(Ordering::Relaxed),
            orchestration_timeouts: self.orchestration_timeouts.load(Ordering::Relaxed),
            malformed_requests: self.malformed_requests.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = DecisionStats::new();
        stats.record_filter_request();
        stats.record_filter_request();
        stats.record_prioritize_request();
        stats.record_admitted(3);
        stats.record_rejected_hot(1);
        stats.record_unavailable(UnavailableCause::Parse);
        stats.record_unavailable(UnavailableCause::Timeout);
        stats.record_unavailable(UnavailableCause::Timeout);
        stats.record_orchestration_timeout();
        stats.record_malformed_request();

        let snap = stats.snapshot();
        assert_eq!(snap.filter_requests, 2);
        assert_eq!(snap.prioritize_requests, 1);
        assert_eq!(snap.nodes_admitted, 3);
        assert_eq!(snap.nodes_rejected_hot, 1);
        assert_eq!(snap.unavailable_fetch, 0);
        assert_eq!(snap.unavailable_parse, 1);
        assert_eq!(snap.unavailable_timeout, 2);
        assert_eq!(snap.orchestration_timeouts, 1);
        assert_eq!(snap.malformed_requests, 1);
    }
}
