//! Ordered node storage with an ID index
//!
//! Nodes live in an arena of slots. The traversal order is a separate list of
//! slot indices, and IDs resolve to slots through a hash map, so lookups by ID
//! stay O(1) while insertion order is preserved.

use std::collections::HashMap;

use shared::NodeId;

use crate::node::Node;

#[derive(Debug, Clone, Default)]
pub struct NodeCollection {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    order: Vec<usize>,
    ids: HashMap<NodeId, usize>,
}

impl NodeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a collection from nodes in order
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut collection = Self::new();
        for node in nodes {
            collection.push(node);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        let slot = *self.ids.get(id)?;
        self.slots[slot].as_ref()
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        let slot = *self.ids.get(id)?;
        self.slots[slot].as_mut()
    }

    /// Position of the node in traversal order
    pub fn position(&self, id: &str) -> Option<usize> {
        let slot = *self.ids.get(id)?;
        self.order.iter().position(|s| *s == slot)
    }

    pub fn nth(&self, n: usize) -> Option<&Node> {
        let slot = *self.order.get(n)?;
        self.slots[slot].as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|slot| self.slots[*slot].as_ref())
    }

    /// IDs in traversal order. Safe to hold while mutating the collection.
    pub fn ids(&self) -> Vec<NodeId> {
        self.iter().map(|n| n.id().to_string()).collect()
    }

    /// Append a node. Its ID must be set and unused.
    pub fn push(&mut self, node: Node) {
        let position = self.order.len();
        self.insert_at(position, node);
    }

    /// Insert a node at `position` in traversal order (clamped to the end)
    pub fn insert_at(&mut self, position: usize, node: Node) {
        debug_assert!(!node.id().is_empty(), "node inserted without an ID");
        debug_assert!(!self.contains(node.id()), "duplicate node ID {}", node.id());

        let id = node.id().to_string();
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.ids.insert(id, slot);
        let position = position.min(self.order.len());
        self.order.insert(position, slot);
    }

    pub fn remove(&mut self, id: &str) -> Option<Node> {
        let slot = self.ids.remove(id)?;
        self.order.retain(|s| *s != slot);
        self.free.push(slot);
        self.slots[slot].take()
    }

    /// Move an existing node to `position` in traversal order
    pub fn move_to(&mut self, id: &str, position: usize) -> bool {
        let Some(&slot) = self.ids.get(id) else {
            return false;
        };
        self.order.retain(|s| *s != slot);
        let position = position.min(self.order.len());
        self.order.insert(position, slot);
        true
    }

    /// Deep copy of every node in order
    pub fn snapshot(&self) -> Vec<Node> {
        self.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.order.clear();
        self.ids.clear();
    }
}
