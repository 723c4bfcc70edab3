//! Scene management
//!
//! The scene owns the node collection, the reference tracker, the undo/redo
//! history and the state stack. Its API is split across the files of this
//! module by concern.

mod display;
mod history;
mod node_ops;
mod persistence;
mod reference_ops;
mod state_ops;

pub use display::{node_display_name, node_summary};
pub use history::UndoEntry;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::collection::NodeCollection;
use crate::error::{SceneError, SceneResult};
use crate::event::{EventDispatcher, EventKind, ObserverId, SceneEvent};
use crate::node::Node;
use crate::references::ReferenceTracker;
use crate::registry::NodeRegistry;
use crate::settings::SceneSettings;
use crate::state::StateStack;

/// The MRML scene
#[derive(Debug)]
pub struct Scene {
    pub(crate) registry: NodeRegistry,
    pub(crate) nodes: NodeCollection,
    pub(crate) references: ReferenceTracker,
    /// Undo stack - checkpoints, oldest first
    pub(crate) undo_stack: Vec<UndoEntry>,
    /// Redo stack - undone checkpoints
    pub(crate) redo_stack: Vec<UndoEntry>,
    pub(crate) states: StateStack,
    pub(crate) observers: EventDispatcher,
    pub(crate) settings: SceneSettings,
    /// Last index handed out per ID base
    pub(crate) unique_id_counters: HashMap<String, usize>,
    /// Next suffix per name base
    pub(crate) unique_name_counters: HashMap<String, usize>,
    pub(crate) undo_flag: bool,
    pub(crate) in_undo: bool,
    pub(crate) url: Option<PathBuf>,
    pub(crate) load_from_string: bool,
    pub(crate) save_to_string: bool,
    pub(crate) scene_string: String,
    pub(crate) error_code: u32,
    pub(crate) error_message: String,
    /// Monotonically increasing modification counter
    pub(crate) version: u64,
    /// Counter value at the last successful import or commit
    pub(crate) stored_version: u64,
    pub(crate) last_loaded_version: Option<String>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with every built-in node class registered
    pub fn new() -> Self {
        Self::with_settings(SceneSettings::default())
    }

    pub fn with_settings(settings: SceneSettings) -> Self {
        Self {
            registry: NodeRegistry::with_builtin_classes(),
            nodes: NodeCollection::new(),
            references: ReferenceTracker::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            states: StateStack::new(),
            observers: EventDispatcher::new(),
            undo_flag: settings.undo_enabled,
            settings,
            unique_id_counters: HashMap::new(),
            unique_name_counters: HashMap::new(),
            in_undo: false,
            url: None,
            load_from_string: false,
            save_to_string: false,
            scene_string: String::new(),
            error_code: 0,
            error_message: String::new(),
            version: 0,
            stored_version: 0,
            last_loaded_version: None,
        }
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Current modification counter (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// True if the scene changed since the last import or commit
    pub fn modified_since_read(&self) -> bool {
        self.version > self.stored_version
    }

    // ── Errors ────────────────────────────────────────────────

    /// 0 after a successful load/save, 1 after a failed one
    pub fn error_code(&self) -> u32 {
        self.error_code
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn set_error_code(&mut self, code: u32) {
        self.error_code = code;
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.error_message = message.into();
    }

    pub(crate) fn record_error(&mut self, err: &SceneError) {
        self.error_code = 1;
        self.error_message = err.to_string();
    }

    pub(crate) fn clear_error(&mut self) {
        self.error_code = 0;
        self.error_message.clear();
    }

    // ── Observers ─────────────────────────────────────────────

    /// Observe one kind of scene event
    pub fn add_observer<F>(&mut self, kind: EventKind, callback: F) -> ObserverId
    where
        F: FnMut(&SceneEvent) + 'static,
    {
        self.observers.register(kind, callback)
    }

    /// Observe every scene event
    pub fn add_observer_all<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&SceneEvent) + 'static,
    {
        self.observers.register_all(callback)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    pub(crate) fn emit(&mut self, event: SceneEvent) {
        self.observers.dispatch(&event);
    }

    pub(crate) fn emit_all(&mut self, events: Vec<SceneEvent>) {
        for event in &events {
            self.observers.dispatch(event);
        }
    }

    // ── Registry ──────────────────────────────────────────────

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Register a node class under `tag` (or its own tag if `None`)
    pub fn register_node_class(&mut self, exemplar: Node, tag: Option<&str>) {
        self.registry.register_node_class(exemplar, tag);
    }

    pub fn get_class_name_by_tag(&self, tag: &str) -> Option<&'static str> {
        self.registry.get_class_name_by_tag(tag)
    }

    pub fn get_tag_by_class_name(&self, class_name: &str) -> Option<&str> {
        self.registry.get_tag_by_class_name(class_name)
    }

    pub fn is_node_class_registered(&self, class_name: &str) -> bool {
        self.registry.is_node_class_registered(class_name)
    }

    pub fn add_default_node(&mut self, node: Node) {
        self.registry.add_default_node(node);
    }

    pub fn get_default_node_by_class(&self, class_name: &str) -> Option<&Node> {
        self.registry.get_default_node_by_class(class_name)
    }

    pub fn remove_all_default_nodes(&mut self) {
        self.registry.remove_all_default_nodes();
    }

    /// New node of `class_name`; not added to the scene
    pub fn create_node_by_class(&self, class_name: &str) -> SceneResult<Node> {
        self.registry.create_node_by_class(class_name).map_err(|e| {
            tracing::warn!("{e}");
            e
        })
    }

    // ── Copy to other scenes ──────────────────────────────────

    /// Register every class of this scene in `target` under the same tags
    pub fn copy_registered_nodes_to_scene(&self, target: &mut Scene) {
        for (tag, exemplar) in self.registry.registrations() {
            target.register_node_class(exemplar.clone(), Some(tag));
        }
    }

    /// Add copies of this scene's singleton nodes to `target`. Singletons
    /// already present there are overwritten.
    pub fn copy_singleton_nodes_to_scene(&self, target: &mut Scene) {
        for node in self.nodes.iter().filter(|n| n.is_singleton()) {
            target.add_node(node.clone());
        }
    }

    /// Copy default nodes into `target`. Its defaults for other classes stay.
    pub fn copy_default_nodes_to_scene(&self, target: &mut Scene) {
        for node in self.registry.default_nodes() {
            target.add_default_node(node.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{InteractionMode, NodeKind};

    #[test]
    fn test_copy_registered_nodes_keeps_aliases() {
        let mut source = Scene::new();
        source.register_node_class(Node::new(NodeKind::Model), Some("Polydata"));
        let mut target = Scene::new();
        source.copy_registered_nodes_to_scene(&mut target);

        assert_eq!(target.get_class_name_by_tag("Polydata"), Some("ModelNode"));
        assert_eq!(target.get_tag_by_class_name("ModelNode"), Some("Model"));
        assert_eq!(
            target.registry().number_of_registered_node_classes(),
            source.registry().number_of_registered_node_classes()
        );
    }

    #[test]
    fn test_copy_singleton_nodes() {
        let mut source = Scene::new();
        source.add_node(Node::new(NodeKind::Model));
        let interaction = source.add_node(Node::new(NodeKind::Interaction {
            mode: InteractionMode::Place,
            place_persistence: true,
        }));

        let mut target = Scene::new();
        let existing = target.add_node(Node::new(NodeKind::interaction()));
        source.copy_singleton_nodes_to_scene(&mut target);

        assert_eq!(existing, interaction);
        assert_eq!(target.number_of_nodes(), 1);
        assert_eq!(
            target.get_node_by_id(&existing).unwrap().kind,
            source.get_node_by_id(&interaction).unwrap().kind
        );
    }

    #[test]
    fn test_copy_default_nodes_keeps_existing() {
        let mut source = Scene::new();
        source.add_default_node(Node::new(NodeKind::model_display()).hidden());
        let mut target = Scene::new();
        target.add_default_node(Node::new(NodeKind::camera()).hidden());
        source.copy_default_nodes_to_scene(&mut target);

        assert!(target.get_default_node_by_class("ModelDisplayNode").is_some());
        assert!(target.get_default_node_by_class("CameraNode").is_some());
        let display = target.create_node_by_class("ModelDisplayNode").unwrap();
        assert!(display.hide_from_editors);
    }
}
