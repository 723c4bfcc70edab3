//! Node reference operations
//!
//! Node references and the tracker are updated together so that the tracker
//! always mirrors what the nodes in the collection declare.

use std::collections::HashSet;

use shared::NodeId;

use crate::error::{SceneError, SceneResult};
use crate::node::Node;

use super::Scene;

impl Scene {
    /// Replace the references of `role` on `node_id` with `referenced` (or none)
    pub fn set_node_reference_id(
        &mut self,
        node_id: &str,
        role: &str,
        referenced: Option<&str>,
    ) -> SceneResult<()> {
        let node = self.referencing_node_mut(node_id)?;
        let previous = node.set_reference(role, referenced);
        let still_referenced: Vec<bool> =
            previous.iter().map(|id| node.references_id(id)).collect();

        for (id, still) in previous.iter().zip(still_referenced) {
            if !still {
                self.references.remove(id, node_id);
            }
        }
        if let Some(referenced) = referenced {
            self.references.add(referenced, node_id);
        }
        self.node_modified(node_id);
        Ok(())
    }

    /// Append `referenced` to the references of `role` on `node_id`
    pub fn add_node_reference_id(
        &mut self,
        node_id: &str,
        role: &str,
        referenced: &str,
    ) -> SceneResult<()> {
        let node = self.referencing_node_mut(node_id)?;
        node.add_reference(role, referenced);
        self.references.add(referenced, node_id);
        self.node_modified(node_id);
        Ok(())
    }

    /// Drop every reference of `role` on `node_id`
    pub fn remove_node_reference_ids(&mut self, node_id: &str, role: &str) -> SceneResult<()> {
        let node = self.referencing_node_mut(node_id)?;
        let removed = node.remove_references(role);
        let still_referenced: Vec<bool> =
            removed.iter().map(|id| node.references_id(id)).collect();

        for (id, still) in removed.iter().zip(still_referenced) {
            if !still {
                self.references.remove(id, node_id);
            }
        }
        self.node_modified(node_id);
        Ok(())
    }

    fn referencing_node_mut(&mut self, node_id: &str) -> SceneResult<&mut Node> {
        match self.nodes.get_mut(node_id) {
            Some(node) => Ok(node),
            None => {
                tracing::error!("Referencing node '{}' is not in the scene", node_id);
                Err(SceneError::NodeNotFound(node_id.to_string()))
            }
        }
    }

    // ── Tracker access ────────────────────────────────────────

    /// Record that `referencing` is interested in `referenced`. Idempotent.
    pub fn add_referenced_node_id(&mut self, referenced: &str, referencing: &str) -> bool {
        self.references.add(referenced, referencing)
    }

    /// Forget one tracker entry; the referencing node itself is untouched
    pub fn remove_referenced_node_id(&mut self, referenced: &str, referencing: &str) -> bool {
        self.references.remove(referenced, referencing)
    }

    pub fn is_node_referencing_node_id(&self, referencing: &str, referenced: &str) -> bool {
        self.references.contains(referenced, referencing)
    }

    /// Number of (referenced ID, referencing node) pairs tracked
    pub fn number_of_node_references(&self) -> usize {
        self.references.len()
    }

    pub fn nth_referencing_node(&self, n: usize) -> Option<&Node> {
        let (_, referencing) = self.references.nth(n)?;
        self.nodes.get(referencing)
    }

    pub fn nth_referenced_id(&self, n: usize) -> Option<&str> {
        self.references.nth(n).map(|(referenced, _)| referenced)
    }

    /// Drop every tracker entry declared by `node_id`
    pub fn remove_node_references(&mut self, node_id: &str) -> usize {
        self.references.remove_node_references(node_id)
    }

    /// Drop every reference to `id`, from the tracker and from the nodes
    /// declaring it
    pub fn remove_references_to_node(&mut self, id: &str) -> usize {
        let referencing = self.references.remove_references_to(id);
        for node_id in &referencing {
            if let Some(node) = self.nodes.get_mut(node_id) {
                if node.update_reference_id(id, None) {
                    tracing::debug!("Dropped reference {} -> {}", node_id, id);
                }
            }
        }
        referencing.len()
    }

    /// Rewrite references to IDs remapped during import. Only nodes in
    /// `subset` are touched when it is given. Returns the number of
    /// references rewritten.
    pub fn update_node_references(&mut self, subset: Option<&[NodeId]>) -> usize {
        let changed: Vec<(NodeId, NodeId)> = self
            .references
            .changed_ids()
            .iter()
            .map(|(old, new)| (old.clone(), new.clone()))
            .collect();
        let subset: Option<HashSet<&str>> =
            subset.map(|ids| ids.iter().map(String::as_str).collect());

        let mut updated = 0;
        for (old, new) in &changed {
            for referencing in self.references.referencing_nodes(old) {
                if subset
                    .as_ref()
                    .is_some_and(|s| !s.contains(referencing.as_str()))
                {
                    continue;
                }
                let Some(node) = self.nodes.get_mut(&referencing) else {
                    continue;
                };
                if node.update_reference_id(old, Some(new)) {
                    updated += 1;
                }
                self.references.remove(old, &referencing);
                self.references.add(new, &referencing);
            }
        }
        updated
    }

    /// Drop tracker entries whose referencing node is gone or no longer
    /// references the ID
    pub fn remove_unused_node_references(&mut self) -> usize {
        let nodes = &self.nodes;
        let removed = self.references.retain(|referenced, referencing| {
            nodes
                .get(referencing)
                .is_some_and(|node| node.references_id(referenced))
        });
        if removed > 0 {
            tracing::debug!("Removed {} unused node references", removed);
        }
        removed
    }

    /// New ID given to `old` when it was remapped on add
    pub fn get_changed_id(&self, old: &str) -> Option<&str> {
        self.references.changed_id(old)
    }

    pub fn add_reserved_id(&mut self, id: &str) {
        self.references.add_reserved_id(id);
    }

    pub fn is_reserved_id(&self, id: &str) -> bool {
        self.references.is_reserved_id(id)
    }

    pub fn remove_reserved_ids(&mut self) {
        self.references.remove_reserved_ids();
    }

    // ── Graph queries ─────────────────────────────────────────

    /// `id` and every node it references, transitively. The start node comes
    /// first; each node appears once.
    pub fn get_referenced_nodes(&self, id: &str) -> Vec<&Node> {
        let Some(start) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut seen: HashSet<&str> = HashSet::from([start.id()]);
        let mut result = vec![start];
        let mut next = 0;
        while next < result.len() {
            let node = result[next];
            next += 1;
            for referenced in node.referenced_ids() {
                let Some(found) = self.nodes.get(&referenced) else {
                    continue;
                };
                if seen.insert(found.id()) {
                    result.push(found);
                }
            }
        }
        result
    }

    /// Nodes in the scene that reference `id`
    pub fn get_referencing_nodes(&self, id: &str) -> Vec<&Node> {
        self.references
            .referencing_nodes(id)
            .iter()
            .filter_map(|referencing| self.nodes.get(referencing))
            .collect()
    }

    /// New scene holding copies of `id` and everything it references
    pub fn get_referenced_sub_scene(&self, id: &str) -> SceneResult<Scene> {
        if !self.nodes.contains(id) {
            return Err(SceneError::NodeNotFound(id.to_string()));
        }
        let mut sub_scene = Scene::with_settings(self.settings.clone());
        self.copy_registered_nodes_to_scene(&mut sub_scene);
        self.copy_default_nodes_to_scene(&mut sub_scene);
        for node in self.get_referenced_nodes(id) {
            sub_scene.add_node(node.clone());
        }
        Ok(sub_scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn model_with_display(scene: &mut Scene) -> (NodeId, NodeId) {
        let display = scene.add_node(Node::new(NodeKind::model_display()));
        let model = scene.add_node(Node::new(NodeKind::Model).with_reference("display", &display));
        (model, display)
    }

    #[test]
    fn test_add_tracks_declared_references() {
        let mut scene = Scene::new();
        let (model, display) = model_with_display(&mut scene);
        assert!(scene.is_node_referencing_node_id(&model, &display));
        assert_eq!(scene.number_of_node_references(), 1);
        assert_eq!(scene.nth_referencing_node(0).unwrap().id(), model);
        assert_eq!(scene.nth_referenced_id(0), Some(display.as_str()));
    }

    #[test]
    fn test_set_reference_replaces_tracker_entry() {
        let mut scene = Scene::new();
        let (model, display) = model_with_display(&mut scene);
        let other = scene.add_node(Node::new(NodeKind::model_display()));

        scene.set_node_reference_id(&model, "display", Some(&other)).unwrap();
        assert!(!scene.is_node_referencing_node_id(&model, &display));
        assert!(scene.is_node_referencing_node_id(&model, &other));

        scene.remove_node_reference_ids(&model, "display").unwrap();
        assert_eq!(scene.number_of_node_references(), 0);
        assert!(scene.get_node_by_id(&model).unwrap().references().is_empty());
    }

    #[test]
    fn test_reference_ops_on_missing_node() {
        let mut scene = Scene::new();
        assert_eq!(
            scene.add_node_reference_id("nope", "display", "D1"),
            Err(SceneError::NodeNotFound("nope".into()))
        );
    }

    #[test]
    fn test_remove_node_purges_references() {
        let mut scene = Scene::new();
        let (model, display) = model_with_display(&mut scene);
        scene.remove_node(&display).unwrap();

        assert_eq!(scene.number_of_node_references(), 0);
        let model = scene.get_node_by_id(&model).unwrap();
        assert_eq!(model.node_reference_id("display"), None);
    }

    #[test]
    fn test_remove_referencing_node_purges_its_entries() {
        let mut scene = Scene::new();
        let (model, display) = model_with_display(&mut scene);
        scene.remove_node(&model).unwrap();
        assert!(scene.get_referencing_nodes(&display).is_empty());
        assert_eq!(scene.number_of_node_references(), 0);
    }

    #[test]
    fn test_update_node_references_respects_subset() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new(NodeKind::Model).with_reference("display", "Old"));
        let b = scene.add_node(Node::new(NodeKind::Model).with_reference("display", "Old"));
        scene.references.record_changed_id("Old", "New");

        assert_eq!(scene.update_node_references(Some(std::slice::from_ref(&a))), 1);
        assert_eq!(scene.get_node_by_id(&a).unwrap().node_reference_id("display"), Some("New"));
        assert_eq!(scene.get_node_by_id(&b).unwrap().node_reference_id("display"), Some("Old"));
        assert!(scene.is_node_referencing_node_id(&a, "New"));
        assert!(scene.is_node_referencing_node_id(&b, "Old"));
    }

    #[test]
    fn test_remove_unused_node_references() {
        let mut scene = Scene::new();
        let (model, display) = model_with_display(&mut scene);
        scene.add_referenced_node_id(&display, "ghost");
        scene.add_referenced_node_id("elsewhere", &model);
        assert_eq!(scene.number_of_node_references(), 3);
        assert_eq!(scene.remove_unused_node_references(), 2);
        assert_eq!(scene.number_of_node_references(), 1);
    }

    #[test]
    fn test_referenced_closure_and_sub_scene() {
        let mut scene = Scene::new();
        let transform = scene.add_node(Node::new(NodeKind::linear_transform()));
        let display = scene.add_node(Node::new(NodeKind::model_display()));
        let model = scene.add_node(
            Node::new(NodeKind::Model)
                .with_reference("display", &display)
                .with_reference("transform", &transform),
        );
        scene.add_node(Node::new(NodeKind::camera()));

        let closure: Vec<&str> = scene.get_referenced_nodes(&model).iter().map(|n| n.id()).collect();
        assert_eq!(closure, vec![model.as_str(), display.as_str(), transform.as_str()]);

        let sub = scene.get_referenced_sub_scene(&model).unwrap();
        assert_eq!(sub.number_of_nodes(), 3);
        assert!(sub.is_node_referencing_node_id(&model, &display));
        assert!(scene.get_referenced_sub_scene("missing").is_err());
    }

    #[test]
    fn test_sub_scene_carries_registry_and_defaults() {
        let mut scene = Scene::new();
        scene.register_node_class(Node::new(NodeKind::Model), Some("Polydata"));
        scene.add_default_node(Node::new(NodeKind::model_display()).hidden());
        let (model, _) = model_with_display(&mut scene);

        let sub = scene.get_referenced_sub_scene(&model).unwrap();
        assert_eq!(sub.get_class_name_by_tag("Polydata"), Some("ModelNode"));
        assert!(sub.get_default_node_by_class("ModelDisplayNode").is_some());
    }
}
