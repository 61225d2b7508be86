use serde_json::Value;

use medproto_core::json::is_truthy;
use medproto_core::models::clinical::CLINICAL_NODE_TYPES;

/// Structural check that untyped JSON looks like a clinical flowchart.
///
/// Only shape is checked: `nodes` and `edges` arrays, every node with a
/// truthy `id`, `type`, `position` and `data`, a clinical `type`, numeric
/// coordinates, and every edge with a truthy `id`, `source` and `target`.
pub fn is_valid_clinical_flowchart(data: &Value) -> bool {
    let Some(object) = data.as_object() else {
        return false;
    };
    let (Some(nodes), Some(edges)) = (
        object.get("nodes").and_then(Value::as_array),
        object.get("edges").and_then(Value::as_array),
    ) else {
        return false;
    };

    nodes.iter().all(is_valid_node) && edges.iter().all(is_valid_edge)
}

fn is_valid_node(node: &Value) -> bool {
    let has_all = ["id", "type", "position", "data"]
        .iter()
        .all(|key| node.get(key).is_some_and(is_truthy));
    if !has_all {
        return false;
    }

    let node_type = node.get("type").and_then(Value::as_str).unwrap_or_default();
    if !CLINICAL_NODE_TYPES.contains(&node_type) {
        return false;
    }

    node.get("position")
        .is_some_and(|p| p.get("x").is_some_and(Value::is_number) && p.get("y").is_some_and(Value::is_number))
}

fn is_valid_edge(edge: &Value) -> bool {
    ["id", "source", "target"]
        .iter()
        .all(|key| edge.get(key).is_some_and(is_truthy))
}
