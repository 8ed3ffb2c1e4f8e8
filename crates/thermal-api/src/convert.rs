//! Conversions between the extender wire format and the decision model.

use std::collections::HashSet;

use thermal_core::extender::{ExtenderArgs, ExtenderFilterResult, HostPriority, HostPriorityList, NodeList};
use thermal_core::{CandidateNode, FilterResult, PriorityResult, SchedulingRequest};

use crate::error::{RequestError, RequestResult};

/// Decode and validate a raw extender request body.
pub fn decode_request(body: &[u8]) -> RequestResult<SchedulingRequest> {
    let args: ExtenderArgs = serde_json::from_slice(body)
        .map_err(|e| RequestError::MalformedRequest(format!("invalid extender args: {e}")))?;
    args_to_request(args)
}

/// Validate decoded args and build a `SchedulingRequest`.
///
/// Full node objects win over `nodenames` when both are present.
pub fn args_to_request(args: ExtenderArgs) -> RequestResult<SchedulingRequest> {
    if !args.pod.is_object() {
        return Err(RequestError::MalformedRequest(
            "pod must be an object".to_string(),
        ));
    }

    let (nodes, names_only, node_list_meta) = match (args.nodes, args.node_names) {
        (Some(list), _) => (
            list.items
                .into_iter()
                .map(CandidateNode::from_descriptor)
                .collect::<Vec<_>>(),
            false,
            list.extra,
        ),
        (None, Some(names)) => (
            names.into_iter().map(CandidateNode::named).collect(),
            true,
            Default::default(),
        ),
        (None, None) => {
            return Err(RequestError::MalformedRequest(
                "request carries neither nodes nor nodenames".to_string(),
            ));
        }
    };

    let mut seen = HashSet::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        if node.name.is_empty() {
            return Err(RequestError::MalformedRequest(format!(
                "node at index {index} has no name"
            )));
        }
        if !seen.insert(node.name.as_str()) {
            return Err(RequestError::MalformedRequest(format!(
                "node {:?} listed more than once",
                node.name
            )));
        }
    }

    Ok(SchedulingRequest {
        pod: args.pod,
        nodes,
        names_only,
        node_list_meta,
    })
}

/// Encode a filter result, answering in the same shape the request used.
///
/// Admitted node objects and the list's own fields go back unchanged.
pub fn filter_response(result: FilterResult, request: &SchedulingRequest) -> ExtenderFilterResult {
    let (nodes, node_names) = if request.names_only {
        let names = result.admitted.into_iter().map(|n| n.name).collect();
        (None, Some(names))
    } else {
        let items = result
            .admitted
            .into_iter()
            .filter_map(|n| n.descriptor)
            .collect();
        (
            Some(NodeList {
                items,
                extra: request.node_list_meta.clone(),
            }),
            None,
        )
    };

    ExtenderFilterResult {
        nodes,
        node_names,
        failed_nodes: result.rejected,
        error: String::new(),
    }
}

/// Encode a priority result; one entry per input node, in input order.
pub fn priority_response(result: PriorityResult) -> HostPriorityList {
    result
        .priorities
        .into_iter()
        .map(|p| HostPriority {
            host: p.node,
            score: p.score,
        })
        .collect()
}
