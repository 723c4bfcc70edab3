//! Display helper functions for nodes

use crate::node::Node;

/// Get display name for a node
pub fn node_display_name(node: &Node) -> String {
    match node.name() {
        Some(name) => format!("{} ({})", name, node.id()),
        None => node.id().to_string(),
    }
}

/// JSON summary of a node, as reported by `inspect`
pub fn node_summary(node: &Node) -> serde_json::Value {
    serde_json::json!({
        "id": node.id(),
        "name": node.name(),
        "class": node.class_name(),
        "display_name": node_display_name(node),
        "hide_from_editors": node.hide_from_editors,
        "singleton_tag": node.singleton_tag,
        "references": node.references(),
    })
}
