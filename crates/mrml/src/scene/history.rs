//! Undo/redo functionality

use std::collections::{HashMap, HashSet};

use shared::NodeId;

use crate::event::SceneEvent;
use crate::node::Node;
use crate::state::SceneStateKind;

use super::Scene;

/// One undo/redo checkpoint: the scene membership at save time plus deep
/// copies of the nodes whose content is restored.
#[derive(Debug, Clone, Default)]
pub struct UndoEntry {
    /// Node IDs in scene order
    membership: Vec<NodeId>,
    /// Saved node content by ID
    saved: HashMap<NodeId, Node>,
}

impl UndoEntry {
    pub fn membership(&self) -> &[NodeId] {
        &self.membership
    }

    pub fn saved_node(&self, id: &str) -> Option<&Node> {
        self.saved.get(id)
    }

    pub fn number_of_saved_nodes(&self) -> usize {
        self.saved.len()
    }
}

impl Scene {
    /// Checkpoint every node
    pub fn save_state_for_undo(&mut self) {
        let ids = self.nodes.ids();
        self.save_state_for_nodes_undo(&ids);
    }

    /// Checkpoint the content of one node
    pub fn save_state_for_node_undo(&mut self, id: &str) {
        self.save_state_for_nodes_undo(&[id.to_string()]);
    }

    /// Checkpoint the content of `ids`. The full membership is recorded too, so
    /// nodes added afterwards are removed again on undo.
    pub fn save_state_for_nodes_undo(&mut self, ids: &[NodeId]) {
        if !self.undo_flag || self.in_undo {
            return;
        }
        let saved = ids
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| (node.id().to_string(), node.clone()))
            .collect();
        let entry = UndoEntry {
            membership: self.nodes.ids(),
            saved,
        };
        self.push_undo(entry);
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, entry: UndoEntry) {
        self.undo_stack.push(entry);
        if self.undo_stack.len() > self.settings.undo_stack_size {
            self.undo_stack.remove(0);
        }
    }

    /// Undo to the last checkpoint. Returns false if there was none.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        let inverse = self.restore(entry);
        self.redo_stack.push(inverse);
        true
    }

    /// Redo the last undone checkpoint. Returns false if there was none.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        let inverse = self.restore(entry);
        self.push_undo(inverse);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn number_of_undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn number_of_redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear_undo_stack(&mut self) {
        self.undo_stack.clear();
    }

    pub fn clear_redo_stack(&mut self) {
        self.redo_stack.clear();
    }

    pub fn undo_flag(&self) -> bool {
        self.undo_flag
    }

    /// Enable or disable recording of checkpoints
    pub fn set_undo_flag(&mut self, enabled: bool) {
        self.undo_flag = enabled;
    }

    /// True while an undo or redo is being applied
    pub fn in_undo(&self) -> bool {
        self.in_undo
    }

    /// Keep a removed node alive in every checkpoint that still lists it
    pub(crate) fn retain_in_history(&mut self, node: &Node) {
        let id = node.id();
        for entry in self.undo_stack.iter_mut().chain(self.redo_stack.iter_mut()) {
            if entry.membership.iter().any(|m| m == id) && !entry.saved.contains_key(id) {
                entry.saved.insert(id.to_string(), node.clone());
            }
        }
    }

    /// Bring the scene back to `entry` and return the entry that reverts it
    fn restore(&mut self, entry: UndoEntry) -> UndoEntry {
        let current = self.nodes.ids();
        let removed: Vec<&NodeId> = current
            .iter()
            .filter(|id| !entry.membership.contains(*id))
            .collect();
        // Removing a node rewrites the nodes referencing it, so those are
        // saved too
        let touched: HashSet<NodeId> = removed
            .iter()
            .flat_map(|id| self.references.referencing_nodes(id))
            .collect();
        let inverse_saved = current
            .iter()
            .filter(|id| {
                entry.saved.contains_key(*id)
                    || !entry.membership.contains(*id)
                    || touched.contains(*id)
            })
            .filter_map(|id| self.nodes.get(id))
            .map(|node| (node.id().to_string(), node.clone()))
            .collect();
        let inverse = UndoEntry {
            membership: current.clone(),
            saved: inverse_saved,
        };

        self.in_undo = true;
        self.start_state(SceneStateKind::Restore);

        for id in removed {
            let _ = self.remove_node(id);
        }

        for id in &entry.membership {
            let Some(saved) = entry.saved.get(id) else {
                if !self.nodes.contains(id) {
                    tracing::warn!("Checkpoint lists '{}' without its content", id);
                }
                continue;
            };
            let class_name = saved.class_name();
            match self.nodes.get_mut(id) {
                Some(node) => {
                    *node = saved.clone();
                    self.emit(SceneEvent::NodeModified {
                        id: id.clone(),
                        class_name,
                    });
                }
                None => {
                    self.emit(SceneEvent::NodeAboutToBeAdded {
                        id: id.clone(),
                        class_name,
                    });
                    self.nodes.push(saved.clone());
                    self.emit(SceneEvent::NodeAdded {
                        id: id.clone(),
                        class_name,
                    });
                }
            }
        }

        for (position, id) in entry.membership.iter().enumerate() {
            self.nodes.move_to(id, position);
        }
        self.references.rebuild(self.nodes.iter());
        self.version += 1;

        let _ = self.end_state(SceneStateKind::Restore);
        self.in_undo = false;
        inverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use crate::settings::SceneSettings;

    #[test]
    fn test_undo_empty_is_noop() {
        let mut scene = Scene::new();
        assert!(!scene.undo());
        assert!(!scene.redo());
        assert!(!scene.can_undo());
    }

    #[test]
    fn test_undo_removes_added_node() {
        let mut scene = Scene::new();
        scene.add_node(Node::new(NodeKind::Model));
        scene.save_state_for_undo();
        scene.add_node(Node::new(NodeKind::camera()));

        assert!(scene.undo());
        assert_eq!(scene.number_of_nodes(), 1);
        assert!(scene.can_redo());

        assert!(scene.redo());
        assert_eq!(scene.number_of_nodes(), 2);
    }

    #[test]
    fn test_undo_restores_removed_node_in_place() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new(NodeKind::Model));
        let b = scene.add_node(Node::new(NodeKind::Model));
        let c = scene.add_node(Node::new(NodeKind::Model));
        scene.save_state_for_undo();
        scene.remove_node(&b).unwrap();

        scene.undo();
        assert_eq!(scene.node_ids(), vec![a, b, c]);
    }

    #[test]
    fn test_partial_checkpoint_restores_only_saved_content() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new(NodeKind::Model).with_name("A"));
        let b = scene.add_node(Node::new(NodeKind::Model).with_name("B"));
        scene.save_state_for_node_undo(&a);

        scene.get_node_by_id_mut(&a).unwrap().name = Some("A2".into());
        scene.get_node_by_id_mut(&b).unwrap().name = Some("B2".into());
        scene.undo();

        assert_eq!(scene.get_node_by_id(&a).unwrap().name(), Some("A"));
        assert_eq!(scene.get_node_by_id(&b).unwrap().name(), Some("B2"));
    }

    #[test]
    fn test_partial_checkpoint_keeps_removed_member() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new(NodeKind::Model));
        let b = scene.add_node(Node::new(NodeKind::camera()));
        scene.save_state_for_node_undo(&a);
        scene.remove_node(&b).unwrap();

        scene.undo();
        assert!(scene.is_node_present(&b));
    }

    #[test]
    fn test_redo_after_partial_checkpoint_restores_dropped_reference() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new(NodeKind::Model));
        let c = scene.add_node(Node::new(NodeKind::Model));
        scene.save_state_for_node_undo(&a);

        let b = scene.add_node(Node::new(NodeKind::model_display()));
        scene.set_node_reference_id(&c, "display", Some(&b)).unwrap();
        let before_undo: Vec<Node> = scene.nodes().cloned().collect();

        scene.undo();
        assert!(!scene.is_node_present(&b));
        assert_eq!(scene.get_node_by_id(&c).unwrap().node_reference_id("display"), None);

        scene.redo();
        assert_eq!(scene.nodes().cloned().collect::<Vec<_>>(), before_undo);
        assert!(scene.is_node_referencing_node_id(&c, &b));
        assert_eq!(scene.number_of_node_references(), 1);
    }

    #[test]
    fn test_save_clears_redo() {
        let mut scene = Scene::new();
        scene.save_state_for_undo();
        scene.add_node(Node::new(NodeKind::Model));
        scene.undo();
        assert_eq!(scene.number_of_redo_levels(), 1);
        scene.save_state_for_undo();
        assert_eq!(scene.number_of_redo_levels(), 0);
    }

    #[test]
    fn test_stack_is_bounded() {
        let mut scene = Scene::with_settings(SceneSettings {
            undo_stack_size: 3,
            ..SceneSettings::default()
        });
        for _ in 0..5 {
            scene.add_node(Node::new(NodeKind::Model));
            scene.save_state_for_undo();
        }
        assert_eq!(scene.number_of_undo_levels(), 3);
        // Oldest surviving checkpoint holds three nodes
        while scene.undo() {}
        assert_eq!(scene.number_of_nodes(), 3);
    }

    #[test]
    fn test_undo_flag_disables_checkpoints() {
        let mut scene = Scene::new();
        scene.set_undo_flag(false);
        scene.save_state_for_undo();
        assert!(!scene.can_undo());
    }

    #[test]
    fn test_restore_rebuilds_tracker() {
        let mut scene = Scene::new();
        let display = scene.add_node(Node::new(NodeKind::model_display()));
        let model = scene.add_node(Node::new(NodeKind::Model).with_reference("display", &display));
        scene.save_state_for_undo();
        scene.remove_node(&display).unwrap();
        assert_eq!(scene.number_of_node_references(), 0);

        scene.undo();
        assert!(scene.is_node_referencing_node_id(&model, &display));
        assert_eq!(
            scene.get_node_by_id(&model).unwrap().node_reference_id("display"),
            Some(display.as_str())
        );
    }

    #[test]
    fn test_restore_fires_restore_state() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut scene = Scene::new();
        scene.save_state_for_undo();
        scene.add_node(Node::new(NodeKind::Model));

        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        scene.add_observer_all(move |e| sink.borrow_mut().push(e.clone()));
        scene.undo();

        let log = log.borrow();
        assert_eq!(log[0], SceneEvent::StartState(SceneStateKind::BatchProcess));
        assert_eq!(log[1], SceneEvent::StartState(SceneStateKind::Restore));
        assert_eq!(log.last(), Some(&SceneEvent::EndState(SceneStateKind::BatchProcess)));
    }
}
