//! Decision model shared by the policy, orchestrator and protocol adapter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extender::Node;

/// Integer ranking value handed back to the scheduler. Higher = cooler = preferred.
pub type PriorityScore = i64;

/// A node the scheduler is considering for the pod.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateNode {
    pub name: String,
    /// Full node object as sent by the scheduler. `None` in node-cache mode,
    /// where the scheduler only sends names.
    pub descriptor: Option<Node>,
}

impl CandidateNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: None,
        }
    }

    pub fn from_descriptor(node: Node) -> Self {
        Self {
            name: node.name().to_string(),
            descriptor: Some(node),
        }
    }
}

/// One validated extender call: the pod plus its candidate nodes in scheduler order.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingRequest {
    pub pod: serde_json::Value,
    pub nodes: Vec<CandidateNode>,
    /// True when the scheduler sent `nodenames` rather than full node objects.
    pub names_only: bool,
    /// List-level fields of the request's `NodeList` (`kind`, `apiVersion`,
    /// ...), echoed back on the filter reply.
    pub node_list_meta: serde_json::Map<String, serde_json::Value>,
}

impl SchedulingRequest {
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }
}

/// Why a node has no usable reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableCause {
    /// Backend unreachable or answered with a non-success status.
    Fetch,
    /// Backend answered but the payload did not carry a usable value.
    Parse,
    /// The fetch did not finish inside the per-fetch timeout.
    Timeout,
}

impl UnavailableCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableCause::Fetch => "fetch",
            UnavailableCause::Parse => "parse",
            UnavailableCause::Timeout => "timeout",
        }
    }
}

impl fmt::Display for UnavailableCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current temperature of a node, or an explicit marker that there is none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Temperature {
    Celsius(f64),
    Unavailable(UnavailableCause),
}

/// A live thermal reading for one node. Never cached across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalReading {
    pub node: String,
    pub temperature: Temperature,
}

impl ThermalReading {
    pub fn celsius(node: impl Into<String>, celsius: f64) -> Self {
        Self {
            node: node.into(),
            temperature: Temperature::Celsius(celsius),
        }
    }

    pub fn unavailable(node: impl Into<String>, cause: UnavailableCause) -> Self {
        Self {
            node: node.into(),
            temperature: Temperature::Unavailable(cause),
        }
    }

    /// Degrees Celsius, if the reading is available.
    pub fn as_celsius(&self) -> Option<f64> {
        match self.temperature {
            Temperature::Celsius(c) => Some(c),
            Temperature::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.as_celsius().is_some()
    }
}

/// Admit/reject decision for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterVerdict {
    Admitted,
    Rejected(String),
}

impl FilterVerdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, FilterVerdict::Admitted)
    }
}

/// Aggregated filter outcome.
///
/// `admitted` keeps the request order; `rejected` maps node name → reason.
/// Together they cover every input node exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResult {
    pub admitted: Vec<CandidateNode>,
    pub rejected: BTreeMap<String, String>,
}

impl FilterResult {
    pub fn admitted_names(&self) -> impl Iterator<Item = &str> {
        self.admitted.iter().map(|n| n.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.admitted.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Score for a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePriority {
    pub node: String,
    pub score: PriorityScore,
}

/// Aggregated prioritize outcome, one entry per input node in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityResult {
    pub priorities: Vec<NodePriority>,
}
