//! Node CRUD operations and queries

use shared::NodeId;

use crate::error::{SceneError, SceneResult};
use crate::event::SceneEvent;
use crate::node::Node;

use super::Scene;

impl Scene {
    // ── ID and name generation ────────────────────────────────

    /// Next unused ID for `base`: `base1`, `base2`, ... The counter is never
    /// rewound, and IDs in use or reserved are skipped.
    pub fn generate_unique_id(&mut self, base: &str) -> NodeId {
        let mut index = self.unique_id_counters.get(base).copied().unwrap_or(0);
        let id = loop {
            index += 1;
            let candidate = format!("{base}{index}");
            if !self.nodes.contains(&candidate) && !self.references.is_reserved_id(&candidate) {
                break candidate;
            }
        };
        self.unique_id_counters.insert(base.to_string(), index);
        id
    }

    /// Next unused name for `base`: `base`, `base_1`, `base_2`, ...
    pub fn generate_unique_name(&mut self, base: &str) -> String {
        let mut index = self.unique_name_counters.get(base).copied().unwrap_or(0);
        let name = loop {
            let candidate = if index == 0 {
                base.to_string()
            } else {
                format!("{base}_{index}")
            };
            index += 1;
            if !self.nodes.iter().any(|n| n.name() == Some(candidate.as_str())) {
                break candidate;
            }
        };
        self.unique_name_counters.insert(base.to_string(), index);
        name
    }

    // ── Add / remove ──────────────────────────────────────────

    /// Add a node and return its scene ID.
    ///
    /// A singleton whose class and tag are already present is not inserted:
    /// its content is copied into the existing node, whose ID is returned.
    /// The passed node is dropped in that case.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        if let Some(tag) = node.singleton_tag.as_deref() {
            if let Some(existing_id) = self
                .get_singleton_node(node.class_name(), tag)
                .map(|n| n.id().to_string())
            {
                self.overwrite_singleton(&existing_id, node);
                return existing_id;
            }
        }
        self.insert_node(None, node)
    }

    fn overwrite_singleton(&mut self, existing_id: &str, node: Node) {
        let Some(existing) = self.nodes.get_mut(existing_id) else {
            return;
        };
        existing.copy_content(&node);
        let class_name = existing.class_name();
        let referenced = existing.referenced_ids();

        self.references.remove_node_references(existing_id);
        for id in &referenced {
            self.references.add(id, existing_id);
        }
        self.references.record_changed_id(node.id(), existing_id);

        tracing::debug!("Singleton {} overwritten", existing_id);
        self.version += 1;
        self.emit(SceneEvent::NodeModified {
            id: existing_id.to_string(),
            class_name,
        });
    }

    /// Assign ID and name, insert at `position` (end if `None`), track references
    fn insert_node(&mut self, position: Option<usize>, mut node: Node) -> NodeId {
        let class_name = node.class_name();
        let wanted = node.id().to_string();

        if wanted.is_empty() || self.nodes.contains(&wanted) {
            let id = match node.singleton_tag.as_deref() {
                Some(tag) if !self.nodes.contains(&format!("{class_name}{tag}")) => {
                    format!("{class_name}{tag}")
                }
                _ => self.generate_unique_id(class_name),
            };
            self.references.record_changed_id(&wanted, &id);
            node.set_id(id);
        }
        if node.name.is_none() {
            node.name = Some(self.generate_unique_name(node.node_tag_name()));
        }

        let id = node.id().to_string();
        self.emit(SceneEvent::NodeAboutToBeAdded {
            id: id.clone(),
            class_name,
        });

        for referenced in node.referenced_ids() {
            self.references.add(&referenced, &id);
        }
        match position {
            Some(position) => self.nodes.insert_at(position, node),
            None => self.nodes.push(node),
        }
        self.version += 1;

        self.emit(SceneEvent::NodeAdded {
            id: id.clone(),
            class_name,
        });
        id
    }

    /// Remove a node, dropping every reference to and from it
    pub fn remove_node(&mut self, id: &str) -> SceneResult<Node> {
        let Some(class_name) = self.nodes.get(id).map(Node::class_name) else {
            tracing::error!("remove_node: node '{}' is not in the scene", id);
            return Err(SceneError::NodeNotFound(id.to_string()));
        };

        self.emit(SceneEvent::NodeAboutToBeRemoved {
            id: id.to_string(),
            class_name,
        });

        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| SceneError::NodeNotFound(id.to_string()))?;
        self.references.remove_node_references(id);
        self.remove_references_to_node(id);
        if !self.in_undo {
            self.retain_in_history(&node);
        }
        self.version += 1;

        self.emit(SceneEvent::NodeRemoved {
            id: id.to_string(),
            class_name,
        });
        Ok(node)
    }

    /// Create a node of `class_name`, optionally named from `base_name`, and add it
    pub fn add_new_node_by_class(
        &mut self,
        class_name: &str,
        base_name: Option<&str>,
    ) -> SceneResult<NodeId> {
        let mut node = self.create_node_by_class(class_name)?;
        if let Some(base) = base_name.filter(|b| !b.is_empty()) {
            node.name = Some(self.generate_unique_name(base));
        }
        Ok(self.add_node(node))
    }

    /// Add a copy of an existing node under a fresh ID. A copied singleton
    /// loses its singleton tag so that it does not collapse into the source.
    pub fn copy_node(&mut self, id: &str) -> SceneResult<NodeId> {
        let source = self
            .nodes
            .get(id)
            .ok_or_else(|| SceneError::NodeNotFound(id.to_string()))?;
        let mut copy = source.new_instance();
        copy.copy_content(source);
        copy.singleton_tag = None;
        Ok(self.add_node(copy))
    }

    /// Add `node` right after `target` in scene order
    pub fn insert_after_node(&mut self, target: &str, node: Node) -> NodeId {
        let position = self.nodes.position(target).map(|p| p + 1);
        self.insert_near(target, position, node)
    }

    /// Add `node` right before `target` in scene order
    pub fn insert_before_node(&mut self, target: &str, node: Node) -> NodeId {
        let position = self.nodes.position(target);
        self.insert_near(target, position, node)
    }

    fn insert_near(&mut self, target: &str, position: Option<usize>, node: Node) -> NodeId {
        if position.is_none() {
            tracing::warn!("Node '{}' not found, appending instead", target);
        }
        if let Some(tag) = node.singleton_tag.as_deref() {
            if self.get_singleton_node(node.class_name(), tag).is_some() {
                return self.add_node(node);
            }
        }
        self.insert_node(position, node)
    }

    /// Notify observers that a node was edited through [`Scene::get_node_by_id_mut`]
    pub fn node_modified(&mut self, id: &str) {
        let Some(class_name) = self.nodes.get(id).map(Node::class_name) else {
            return;
        };
        self.version += 1;
        self.emit(SceneEvent::NodeModified {
            id: id.to_string(),
            class_name,
        });
    }

    /// Reset every node to its constructor (or default-node) state
    pub fn reset_nodes(&mut self) {
        for id in self.nodes.ids() {
            self.reset_node(&id);
        }
        self.references.rebuild(self.nodes.iter());
    }

    pub(crate) fn reset_node(&mut self, id: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let class_name = node.class_name();
        node.reset(self.registry.get_default_node_by_class(class_name));
        self.version += 1;
        self.emit(SceneEvent::NodeModified {
            id: id.to_string(),
            class_name,
        });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn get_node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable access. Call [`Scene::node_modified`] afterwards to notify.
    pub fn get_node_by_id_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn is_node_present(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    /// Nodes in scene order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// IDs in scene order; safe to hold while mutating the scene
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.ids()
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nth_node(&self, n: usize) -> Option<&Node> {
        self.nodes.nth(n)
    }

    /// Nodes that are `class_name` or derive from it
    pub fn get_nodes_by_class(&self, class_name: &str) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.is_a(class_name)).collect()
    }

    pub fn number_of_nodes_by_class(&self, class_name: &str) -> usize {
        self.nodes.iter().filter(|n| n.is_a(class_name)).count()
    }

    pub fn nth_node_by_class(&self, n: usize, class_name: &str) -> Option<&Node> {
        self.nodes.iter().filter(|node| node.is_a(class_name)).nth(n)
    }

    pub fn first_node_by_class(&self, class_name: &str) -> Option<&Node> {
        self.nth_node_by_class(0, class_name)
    }

    pub fn get_nodes_by_name(&self, name: &str) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.name() == Some(name)).collect()
    }

    pub fn get_first_node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == Some(name))
    }

    pub fn get_nodes_by_class_by_name(&self, class_name: &str, name: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.is_a(class_name) && n.name() == Some(name))
            .collect()
    }

    /// First node matching every given filter. A name filter matches exactly,
    /// or as a prefix when `exact_name_match` is false.
    pub fn get_first_node(
        &self,
        name: Option<&str>,
        class_name: Option<&str>,
        hide_from_editors: Option<bool>,
        exact_name_match: bool,
    ) -> Option<&Node> {
        self.nodes.iter().find(|node| {
            let name_ok = match (name, node.name()) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(wanted), Some(actual)) if exact_name_match => actual == wanted,
                (Some(wanted), Some(actual)) => actual.starts_with(wanted),
            };
            name_ok
                && class_name.map_or(true, |c| node.is_a(c))
                && hide_from_editors.map_or(true, |h| node.hide_from_editors == h)
        })
    }

    pub fn get_singleton_node(&self, class_name: &str, singleton_tag: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| {
            n.class_name() == class_name && n.singleton_tag.as_deref() == Some(singleton_tag)
        })
    }
}
