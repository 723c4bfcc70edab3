//! Node class registry and default nodes

use std::collections::HashMap;

use crate::error::{SceneError, SceneResult};
use crate::node::{Node, NodeKind};

/// Registered (tag, exemplar) pair
#[derive(Debug, Clone)]
struct Registration {
    tag: String,
    exemplar: Node,
}

/// Maps tags to node classes and creates nodes from either
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    registrations: Vec<Registration>,
    default_nodes: HashMap<String, Node>,
}

impl NodeRegistry {
    /// Registry with every built-in node class
    pub fn with_builtin_classes() -> Self {
        let mut registry = Self::default();
        for kind in NodeKind::all() {
            registry.register_node_class(Node::new(kind), None);
        }
        registry
    }

    /// Register `exemplar`'s class under `tag`, or under its own tag if none
    /// is given. Registering an existing tag replaces the previous class.
    pub fn register_node_class(&mut self, exemplar: Node, tag: Option<&str>) {
        let tag = match tag.filter(|t| !t.is_empty()) {
            Some(tag) => tag.to_string(),
            None => exemplar.node_tag_name().to_string(),
        };
        let registration = Registration { tag, exemplar };

        match self
            .registrations
            .iter_mut()
            .find(|r| r.tag == registration.tag)
        {
            Some(existing) => {
                tracing::debug!(
                    "Tag '{}' re-registered: {} -> {}",
                    registration.tag,
                    existing.exemplar.class_name(),
                    registration.exemplar.class_name()
                );
                *existing = registration;
            }
            None => self.registrations.push(registration),
        }
    }

    pub fn get_class_name_by_tag(&self, tag: &str) -> Option<&'static str> {
        self.registrations
            .iter()
            .find(|r| r.tag == tag)
            .map(|r| r.exemplar.class_name())
    }

    /// First tag registered for the class
    pub fn get_tag_by_class_name(&self, class_name: &str) -> Option<&str> {
        self.find_by_class(class_name).map(|r| r.tag.as_str())
    }

    pub fn is_node_class_registered(&self, class_name: &str) -> bool {
        self.find_by_class(class_name).is_some()
    }

    /// Distinct registered class names, in registration order
    pub fn node_classes_list(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        for r in &self.registrations {
            let class = r.exemplar.class_name();
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        classes
    }

    pub fn number_of_registered_node_classes(&self) -> usize {
        self.registrations.len()
    }

    pub fn nth_registered_node_class(&self, n: usize) -> Option<&Node> {
        self.registrations.get(n).map(|r| &r.exemplar)
    }

    /// (tag, exemplar) pairs in registration order
    pub fn registrations(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.registrations
            .iter()
            .map(|r| (r.tag.as_str(), &r.exemplar))
    }

    fn find_by_class(&self, class_name: &str) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.exemplar.class_name() == class_name)
    }

    // ── Creation ──────────────────────────────────────────────

    /// New node of `class_name`, seeded from the matching default node.
    /// The node is not added to any scene.
    pub fn create_node_by_class(&self, class_name: &str) -> SceneResult<Node> {
        let registration = self
            .find_by_class(class_name)
            .ok_or_else(|| SceneError::UnregisteredClass(class_name.to_string()))?;

        let mut node = registration.exemplar.new_instance();
        if let Some(default) = self.get_default_node_by_class(class_name) {
            let singleton_tag = node.singleton_tag.clone();
            node.copy_content(default);
            node.name = None;
            node.singleton_tag = singleton_tag;
        }
        Ok(node)
    }

    pub fn create_node_by_tag(&self, tag: &str) -> SceneResult<Node> {
        let class_name = self
            .get_class_name_by_tag(tag)
            .ok_or_else(|| SceneError::UnknownTag(tag.to_string()))?;
        self.create_node_by_class(class_name)
    }

    // ── Default nodes ─────────────────────────────────────────

    /// Set the default node for the node's class, replacing any previous one
    pub fn add_default_node(&mut self, node: Node) {
        let class_name = node.class_name().to_string();
        if self.default_nodes.insert(class_name.clone(), node).is_some() {
            tracing::debug!("Replaced default node for {}", class_name);
        }
    }

    pub fn get_default_node_by_class(&self, class_name: &str) -> Option<&Node> {
        self.default_nodes.get(class_name)
    }

    pub fn default_nodes(&self) -> impl Iterator<Item = &Node> {
        self.default_nodes.values()
    }

    pub fn remove_all_default_nodes(&mut self) {
        self.default_nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tags() {
        let r = NodeRegistry::with_builtin_classes();
        assert_eq!(r.get_class_name_by_tag("Model"), Some("ModelNode"));
        assert_eq!(r.get_tag_by_class_name("CameraNode"), Some("Camera"));
        assert_eq!(r.get_class_name_by_tag("model"), None);
        assert!(r.is_node_class_registered("InteractionNode"));
        assert_eq!(r.number_of_registered_node_classes(), 8);
    }

    #[test]
    fn test_alias_tag() {
        let mut r = NodeRegistry::with_builtin_classes();
        r.register_node_class(Node::new(NodeKind::Model), Some("ModelHierarchy"));
        assert_eq!(r.get_class_name_by_tag("ModelHierarchy"), Some("ModelNode"));
        assert_eq!(r.get_tag_by_class_name("ModelNode"), Some("Model"));
        assert_eq!(r.number_of_registered_node_classes(), 9);
        assert_eq!(r.node_classes_list().len(), 8);
    }

    #[test]
    fn test_empty_tag_falls_back() {
        let mut r = NodeRegistry::default();
        r.register_node_class(Node::new(NodeKind::camera()), Some(""));
        assert_eq!(r.get_class_name_by_tag("Camera"), Some("CameraNode"));
    }

    #[test]
    fn test_reregistering_tag_replaces() {
        let mut r = NodeRegistry::default();
        r.register_node_class(Node::new(NodeKind::Model), Some("Thing"));
        r.register_node_class(Node::new(NodeKind::camera()), Some("Thing"));
        assert_eq!(r.number_of_registered_node_classes(), 1);
        assert_eq!(r.get_class_name_by_tag("Thing"), Some("CameraNode"));
    }

    #[test]
    fn test_create_unregistered_class() {
        let r = NodeRegistry::default();
        assert_eq!(
            r.create_node_by_class("ModelNode"),
            Err(SceneError::UnregisteredClass("ModelNode".into()))
        );
        assert_eq!(
            r.create_node_by_tag("Volume"),
            Err(SceneError::UnknownTag("Volume".into()))
        );
    }

    #[test]
    fn test_create_applies_default_node() {
        let mut r = NodeRegistry::with_builtin_classes();
        let mut default = Node::new(NodeKind::model_display()).with_name("ignored");
        default.kind = NodeKind::ModelDisplay {
            color: [1.0, 1.0, 0.0],
            opacity: 0.5,
            visibility: true,
            scalar_visibility: false,
        };
        r.add_default_node(default.clone());

        let node = r.create_node_by_class("ModelDisplayNode").unwrap();
        assert_eq!(node.kind, default.kind);
        assert_eq!(node.name(), None);
        assert_eq!(node.id(), "");

        r.remove_all_default_nodes();
        let node = r.create_node_by_class("ModelDisplayNode").unwrap();
        assert_eq!(node.kind, NodeKind::model_display());
    }

    #[test]
    fn test_default_node_is_per_class() {
        let mut r = NodeRegistry::with_builtin_classes();
        r.add_default_node(Node::new(NodeKind::model_display()));
        assert!(r.get_default_node_by_class("ModelDisplayNode").is_some());
        assert!(r.get_default_node_by_class("ModelNode").is_none());
        assert_eq!(r.default_nodes().count(), 1);
    }
}
