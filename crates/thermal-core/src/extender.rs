//! Scheduler-extender wire format.
//!
//! Mirrors the JSON shapes the cluster scheduler posts to, and expects back
//! from, an HTTP extender. Node objects are opaque: only `metadata.name` is
//! read, every other field is carried through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a filter or prioritize call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtenderArgs {
    /// The pod being scheduled. Required; not interpreted.
    pub pod: Value,
    /// Full candidate node objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<NodeList>,
    /// Candidate names only, sent when the extender is node-cache capable.
    #[serde(default, rename = "nodenames", skip_serializing_if = "Option::is_none")]
    pub node_names: Option<Vec<String>>,
}

/// A list of node objects (`v1.NodeList`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeList {
    #[serde(default)]
    pub items: Vec<Node>,
    /// `apiVersion`, `kind`, `metadata` and anything else on the list.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A node object (`v1.Node`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Object metadata; only the name matters here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response body of the filter call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtenderFilterResult {
    /// Admitted node objects (full-object mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<NodeList>,
    /// Admitted node names (node-cache mode).
    #[serde(default, rename = "nodenames", skip_serializing_if = "Option::is_none")]
    pub node_names: Option<Vec<String>>,
    /// Rejected node name → human-readable reason.
    #[serde(default, rename = "failedNodes")]
    pub failed_nodes: BTreeMap<String, String>,
    /// Empty on success.
    #[serde(default)]
    pub error: String,
}

impl ExtenderFilterResult {
    /// A filter response that carries only an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            ..Self::default()
        }
    }
}

/// Score for one host in a prioritize response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPriority {
    pub host: String,
    pub score: i64,
}

/// Response body of the prioritize call.
pub type HostPriorityList = Vec<HostPriority>;
