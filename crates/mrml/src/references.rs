//! Reference tracking by node ID
//!
//! The tracker records which nodes declared interest in which IDs, the IDs
//! remapped during import (old -> new) and IDs reserved against generation.
//! Referencing nodes are stored by ID, never by pointer, so entries survive
//! node replacement during undo/redo.

use std::collections::{BTreeMap, BTreeSet};

use shared::NodeId;

use crate::node::Node;

#[derive(Debug, Clone, Default)]
pub struct ReferenceTracker {
    /// referenced ID -> referencing node IDs
    references: BTreeMap<NodeId, BTreeSet<NodeId>>,
    /// old ID -> new ID
    changed_ids: BTreeMap<NodeId, NodeId>,
    reserved_ids: BTreeSet<NodeId>,
}

impl ReferenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `referencing` is interested in `referenced`. Idempotent.
    pub fn add(&mut self, referenced: &str, referencing: &str) -> bool {
        if referenced.is_empty() || referencing.is_empty() {
            return false;
        }
        self.references
            .entry(referenced.to_string())
            .or_default()
            .insert(referencing.to_string())
    }

    pub fn remove(&mut self, referenced: &str, referencing: &str) -> bool {
        let Some(set) = self.references.get_mut(referenced) else {
            return false;
        };
        let removed = set.remove(referencing);
        if set.is_empty() {
            self.references.remove(referenced);
        }
        removed
    }

    pub fn contains(&self, referenced: &str, referencing: &str) -> bool {
        self.references
            .get(referenced)
            .is_some_and(|set| set.contains(referencing))
    }

    /// Number of (referenced, referencing) pairs
    pub fn len(&self) -> usize {
        self.references.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// n-th (referenced, referencing) pair in sorted order
    pub fn nth(&self, n: usize) -> Option<(&str, &str)> {
        self.pairs().nth(n)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.references.iter().flat_map(|(referenced, set)| {
            set.iter()
                .map(move |referencing| (referenced.as_str(), referencing.as_str()))
        })
    }

    pub fn referencing_nodes(&self, referenced: &str) -> Vec<NodeId> {
        self.references
            .get(referenced)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop every entry declared by `referencing`
    pub fn remove_node_references(&mut self, referencing: &str) -> usize {
        let mut removed = 0;
        self.references.retain(|_, set| {
            if set.remove(referencing) {
                removed += 1;
            }
            !set.is_empty()
        });
        removed
    }

    /// Drop the entry keyed by `referenced`, returning who referenced it
    pub fn remove_references_to(&mut self, referenced: &str) -> BTreeSet<NodeId> {
        self.references.remove(referenced).unwrap_or_default()
    }

    /// Keep only pairs for which `keep(referenced, referencing)` holds
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) -> usize {
        let before = self.len();
        self.references.retain(|referenced, set| {
            set.retain(|referencing| keep(referenced.as_str(), referencing.as_str()));
            !set.is_empty()
        });
        before - self.len()
    }

    /// Move every referencing node from `old` to `new`
    pub fn rename_referenced(&mut self, old: &str, new: &str) {
        if let Some(set) = self.references.remove(old) {
            self.references.entry(new.to_string()).or_default().extend(set);
        }
    }

    /// Replace all entries with the references declared by `nodes`
    pub fn rebuild<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) {
        self.references.clear();
        for node in nodes {
            for referenced in node.referenced_ids() {
                self.add(&referenced, node.id());
            }
        }
    }

    pub fn clear(&mut self) {
        self.references.clear();
        self.changed_ids.clear();
    }

    // ── Changed IDs ───────────────────────────────────────────

    pub fn record_changed_id(&mut self, old: &str, new: &str) {
        if old != new && !old.is_empty() {
            self.changed_ids.insert(old.to_string(), new.to_string());
        }
    }

    pub fn changed_id(&self, old: &str) -> Option<&str> {
        self.changed_ids.get(old).map(String::as_str)
    }

    pub fn changed_ids(&self) -> &BTreeMap<NodeId, NodeId> {
        &self.changed_ids
    }

    pub fn clear_changed_ids(&mut self) {
        self.changed_ids.clear();
    }

    // ── Reserved IDs ──────────────────────────────────────────

    pub fn add_reserved_id(&mut self, id: &str) {
        if !id.is_empty() {
            self.reserved_ids.insert(id.to_string());
        }
    }

    pub fn is_reserved_id(&self, id: &str) -> bool {
        self.reserved_ids.contains(id)
    }

    pub fn remove_reserved_ids(&mut self) {
        self.reserved_ids.clear();
    }
}
