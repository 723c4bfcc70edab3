//! Scene load/save functionality

use std::path::{Path, PathBuf};

use shared::{NodeElement, NodeId, SceneDocument};

use crate::error::{SceneError, SceneResult};
use crate::event::SceneEvent;
use crate::node::Node;
use crate::state::SceneStateKind;

use super::Scene;

impl Scene {
    pub fn set_url(&mut self, url: impl Into<PathBuf>) {
        self.url = Some(url.into());
    }

    pub fn url(&self) -> Option<&Path> {
        self.url.as_deref()
    }

    /// Read from [`Scene::scene_string`] instead of the URL
    pub fn set_load_from_string(&mut self, enabled: bool) {
        self.load_from_string = enabled;
    }

    /// Write to [`Scene::scene_string`] instead of the URL
    pub fn set_save_to_string(&mut self, enabled: bool) {
        self.save_to_string = enabled;
    }

    pub fn set_scene_string(&mut self, document: impl Into<String>) {
        self.scene_string = document.into();
    }

    pub fn scene_string(&self) -> &str {
        &self.scene_string
    }

    /// Version recorded in the last imported document
    pub fn last_loaded_version(&self) -> Option<&str> {
        self.last_loaded_version.as_deref()
    }

    // ── Clear ─────────────────────────────────────────────────

    /// Remove every node. Singletons are reset in place unless
    /// `remove_singletons` is set. Undo history is dropped.
    pub fn clear(&mut self, remove_singletons: bool) {
        self.start_state(SceneStateKind::Close);

        self.undo_stack.clear();
        self.redo_stack.clear();

        let mut kept = Vec::new();
        let ids = self.nodes.ids();
        let total = ids.len();
        for (index, id) in ids.into_iter().rev().enumerate() {
            let singleton = self.nodes.get(&id).is_some_and(Node::is_singleton);
            if singleton && !remove_singletons {
                kept.push(id);
            } else {
                let _ = self.remove_node(&id);
            }
            self.progress_state(SceneStateKind::Close, ((index + 1) * 100 / total) as u32);
        }
        for id in kept.iter().rev() {
            self.reset_node(id);
        }

        self.references.clear();
        self.references.remove_reserved_ids();
        self.references.rebuild(self.nodes.iter());
        self.version += 1;

        self.emit(SceneEvent::NewScene);
        let _ = self.end_state(SceneStateKind::Close);
        tracing::debug!("Scene cleared, {} singletons kept", kept.len());
    }

    // ── Load ──────────────────────────────────────────────────

    /// Replace the scene with the document at `url` (or the current URL /
    /// scene string). Runs as one batch: close, then import.
    pub fn connect(&mut self, url: Option<&Path>) -> SceneResult<()> {
        if let Some(url) = url {
            self.set_url(url);
        }
        let undo_flag = self.undo_flag;
        self.undo_flag = false;

        self.start_state(SceneStateKind::BatchProcess);
        self.clear(false);
        let result = self.import(None);
        let _ = self.end_state(SceneStateKind::BatchProcess);

        self.undo_flag = undo_flag;
        result
    }

    /// Merge the document at `url` (or the current URL / scene string) into
    /// the scene. On failure the scene is left as it was and the error is
    /// recorded in [`Scene::error_code`] / [`Scene::error_message`].
    pub fn import(&mut self, url: Option<&Path>) -> SceneResult<()> {
        if let Some(url) = url {
            self.set_url(url);
        }
        self.clear_error();

        self.start_state(SceneStateKind::Import);
        let result = self.import_document();
        let _ = self.end_state(SceneStateKind::Import);

        match result {
            Ok(count) => {
                self.stored_version = self.version;
                tracing::info!("Imported {} nodes", count);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Import failed: {e}");
                self.record_error(&e);
                Err(e)
            }
        }
    }

    fn read_document(&self) -> SceneResult<SceneDocument> {
        let text = if self.load_from_string {
            self.scene_string.clone()
        } else {
            let url = self.url.as_ref().ok_or(SceneError::NoUrl)?;
            std::fs::read_to_string(url)?
        };
        Ok(SceneDocument::from_json(&text)?)
    }

    /// Parse every element first so that a malformed document adds nothing
    fn import_document(&mut self) -> SceneResult<usize> {
        let document = self.read_document()?;

        let mut loaded = Vec::with_capacity(document.nodes.len());
        for element in &document.nodes {
            let mut node = match self.registry.create_node_by_tag(&element.tag) {
                Ok(node) => node,
                Err(e) => {
                    tracing::warn!("Skipping element: {e}");
                    continue;
                }
            };
            node.read_attributes(&element.attributes)?;
            loaded.push(node);
        }

        self.references.clear_changed_ids();
        for node in &loaded {
            self.references.add_reserved_id(node.id());
        }

        let total = loaded.len();
        let mut imported: Vec<NodeId> = Vec::with_capacity(total);
        for (index, node) in loaded.into_iter().enumerate() {
            imported.push(self.add_node(node));
            self.progress_state(SceneStateKind::Import, ((index + 1) * 100 / total) as u32);
        }

        self.remove_reserved_ids();
        self.update_node_references(Some(imported.as_slice()));
        self.remove_unused_node_references();
        self.last_loaded_version = Some(document.version);
        Ok(total)
    }

    // ── Save ──────────────────────────────────────────────────

    /// Persisted form of the scene
    pub fn to_document(&self) -> SceneDocument {
        let nodes = self
            .nodes
            .iter()
            .map(|node| NodeElement {
                tag: self
                    .registry
                    .get_tag_by_class_name(node.class_name())
                    .unwrap_or(node.node_tag_name())
                    .to_string(),
                attributes: node.write_attributes(),
            })
            .collect();
        SceneDocument {
            version: self.settings.version.clone(),
            nodes,
        }
    }

    /// Write the scene to `url` (or the current URL / scene string)
    pub fn commit(&mut self, url: Option<&Path>) -> SceneResult<()> {
        self.clear_error();

        self.start_state(SceneStateKind::Save);
        let result = self.write_document(url);
        let _ = self.end_state(SceneStateKind::Save);

        match result {
            Ok(()) => {
                self.stored_version = self.version;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Commit failed: {e}");
                self.record_error(&e);
                Err(e)
            }
        }
    }

    fn write_document(&mut self, url: Option<&Path>) -> SceneResult<()> {
        let text = self.to_document().to_json(self.settings.pretty_documents)?;
        if self.save_to_string {
            self.scene_string = text;
            return Ok(());
        }
        let path = match url {
            Some(url) => url.to_path_buf(),
            None => self.url.clone().ok_or(SceneError::NoUrl)?,
        };
        std::fs::write(&path, text)?;
        tracing::info!("Scene written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn scene_from_string(json: &str) -> Scene {
        let mut scene = Scene::new();
        scene.set_load_from_string(true);
        scene.set_scene_string(json);
        scene
    }

    #[test]
    fn test_import_from_string() {
        let json = r#"{"version": "Slicer4.2.0", "nodes": [
            {"tag": "ModelDisplay", "attributes": {"id": "vtkMRMLModelDisplayNode4", "opacity": "0.3"}},
            {"tag": "Model", "attributes": {"id": "vtkMRMLModelNode4", "name": "Skull",
                "references": "display:vtkMRMLModelDisplayNode4;"}}
        ]}"#;
        let mut scene = scene_from_string(json);
        scene.import(None).unwrap();

        assert_eq!(scene.number_of_nodes(), 2);
        assert_eq!(scene.last_loaded_version(), Some("Slicer4.2.0"));
        assert!(scene.is_node_referencing_node_id("vtkMRMLModelNode4", "vtkMRMLModelDisplayNode4"));
        assert!(!scene.modified_since_read());
        assert!(!scene.is_reserved_id("vtkMRMLModelNode4"));
    }

    #[test]
    fn test_import_remaps_conflicting_ids() {
        let mut scene = Scene::new();
        let display = scene.add_node(Node::new(NodeKind::model_display()).with_id("D"));
        let model = scene.add_node(Node::new(NodeKind::Model).with_id("M").with_reference("display", "D"));

        scene.set_load_from_string(true);
        scene.set_scene_string(
            r#"{"nodes": [
                {"tag": "ModelDisplay", "attributes": {"id": "D"}},
                {"tag": "Model", "attributes": {"id": "M2", "references": "display:D;"}}
            ]}"#,
        );
        scene.import(None).unwrap();

        let new_display = scene.get_changed_id("D").unwrap().to_string();
        assert_ne!(new_display, display);
        let imported = scene.get_node_by_id("M2").unwrap();
        assert_eq!(imported.node_reference_id("display"), Some(new_display.as_str()));
        let original = scene.get_node_by_id(&model).unwrap();
        assert_eq!(original.node_reference_id("display"), Some("D"));
    }

    #[test]
    fn test_import_skips_unknown_tags() {
        let mut scene = scene_from_string(
            r#"{"nodes": [{"tag": "Volume", "attributes": {}}, {"tag": "Camera", "attributes": {}}]}"#,
        );
        scene.import(None).unwrap();
        assert_eq!(scene.number_of_nodes(), 1);
    }

    #[test]
    fn test_failed_import_leaves_scene_usable() {
        let mut scene = Scene::new();
        scene.add_node(Node::new(NodeKind::Model));
        scene.set_load_from_string(true);
        scene.set_scene_string(
            r#"{"nodes": [{"tag": "Camera", "attributes": {}}, {"tag": "ModelDisplay", "attributes": {"opacity": "x"}}]}"#,
        );

        assert!(scene.import(None).is_err());
        assert_eq!(scene.error_code(), 1);
        assert!(scene.error_message().contains("opacity"));
        assert_eq!(scene.number_of_nodes(), 1);
        assert_eq!(scene.states(), 0);

        scene.set_scene_string("not json");
        assert!(matches!(scene.import(None), Err(SceneError::Parse(_))));
    }

    #[test]
    fn test_import_without_url() {
        let mut scene = Scene::new();
        assert_eq!(scene.import(None), Err(SceneError::NoUrl));
        assert_eq!(scene.error_message(), "No scene URL set");
    }

    #[test]
    fn test_commit_to_string() {
        let mut scene = Scene::new();
        scene.add_node(Node::new(NodeKind::camera()));
        scene.set_save_to_string(true);
        scene.commit(None).unwrap();

        let document = SceneDocument::from_json(scene.scene_string()).unwrap();
        assert_eq!(document.nodes.len(), 1);
        assert_eq!(document.nodes[0].tag, "Camera");
        assert_eq!(document.version, "Slicer4.4.0");
        assert!(!scene.modified_since_read());
    }

    #[test]
    fn test_clear_reports_close_progress() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut scene = Scene::new();
        scene.add_node(Node::new(NodeKind::Model));
        scene.add_node(Node::new(NodeKind::camera()));
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        scene.add_observer(crate::event::EventKind::ProgressState, move |e| {
            sink.borrow_mut().push(e.clone());
        });

        scene.clear(false);
        assert_eq!(
            *log.borrow(),
            vec![
                SceneEvent::ProgressState(SceneStateKind::Close, 50),
                SceneEvent::ProgressState(SceneStateKind::BatchProcess, 50),
                SceneEvent::ProgressState(SceneStateKind::Close, 100),
                SceneEvent::ProgressState(SceneStateKind::BatchProcess, 100),
            ]
        );
    }

    #[test]
    fn test_clear_keeps_and_resets_singletons() {
        let mut scene = Scene::new();
        scene.add_node(Node::new(NodeKind::Model));
        let interaction = scene.add_node(Node::new(NodeKind::Interaction {
            mode: crate::node::InteractionMode::Place,
            place_persistence: true,
        }));
        scene.save_state_for_undo();

        scene.clear(false);
        assert_eq!(scene.node_ids(), vec![interaction.clone()]);
        assert_eq!(scene.get_node_by_id(&interaction).unwrap().kind, NodeKind::interaction());
        assert!(!scene.can_undo());

        scene.clear(true);
        assert_eq!(scene.number_of_nodes(), 0);
    }
}
