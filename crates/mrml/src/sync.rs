//! Scene consumers that mirror a subset of nodes
//!
//! [`DisplayableMirror`] follows the batch-processing contract: per-node add
//! and remove events are ignored while a batch is running, and a single full
//! resynchronisation is requested when the outermost batch ends.

use std::collections::BTreeSet;

use shared::NodeId;

use crate::event::SceneEvent;
use crate::node::NodeKind;
use crate::scene::Scene;
use crate::state::SceneStateKind;

/// Mirror of the scene nodes belonging to a set of watched classes
#[derive(Debug, Clone, Default)]
pub struct DisplayableMirror {
    watched_classes: Vec<String>,
    nodes: BTreeSet<NodeId>,
    batch_processing: bool,
    needs_resync: bool,
    /// Number of full resynchronisations performed
    pub resync_count: usize,
    /// Number of per-node updates applied outside batches
    pub incremental_updates: usize,
}

impl DisplayableMirror {
    /// Watch nodes that are, or derive from, any of `classes`
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            watched_classes: classes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn watches(&self, class_name: &str) -> bool {
        let hierarchy = NodeKind::hierarchy_of(class_name).unwrap_or(&[]);
        self.watched_classes
            .iter()
            .any(|watched| watched == class_name || hierarchy.contains(&watched.as_str()))
    }

    pub fn handle_event(&mut self, event: &SceneEvent) {
        match event {
            SceneEvent::StartState(SceneStateKind::BatchProcess) => {
                self.batch_processing = true;
            }
            SceneEvent::EndState(SceneStateKind::BatchProcess) => {
                self.batch_processing = false;
                self.needs_resync = true;
            }
            SceneEvent::NodeAdded { id, class_name } if !self.batch_processing => {
                if self.watches(class_name) {
                    self.nodes.insert(id.clone());
                    self.incremental_updates += 1;
                }
            }
            SceneEvent::NodeRemoved { id, .. } if !self.batch_processing => {
                if self.nodes.remove(id) {
                    self.incremental_updates += 1;
                }
            }
            SceneEvent::NewScene if !self.batch_processing => {
                self.needs_resync = true;
            }
            _ => {}
        }
    }

    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    /// Rebuild the mirror from the scene
    pub fn resync(&mut self, scene: &Scene) {
        self.nodes = scene
            .nodes()
            .filter(|node| self.watches(node.class_name()))
            .map(|node| node.id().to_string())
            .collect();
        self.needs_resync = false;
        self.resync_count += 1;
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
