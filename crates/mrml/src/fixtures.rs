//! Factory functions for creating test data.
//!
//! Provides helpers to construct nodes, scenes and scene documents used in
//! tests and by the command protocol.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use shared::{NodeElement, NodeId, SceneDocument};

use crate::node::{InteractionMode, Node, NodeKind};
use crate::scene::Scene;

// ── Node factories ──────────────────────────────────────────────

/// Create an unnamed model node.
pub fn model_node() -> Node {
    Node::new(NodeKind::Model)
}

/// Create a model display node with a color.
pub fn display_node(color: [f64; 3]) -> Node {
    Node::new(NodeKind::ModelDisplay {
        color,
        opacity: 1.0,
        visibility: true,
        scalar_visibility: false,
    })
}

/// Create a model storage node pointing at a file.
pub fn storage_node(file_name: &str) -> Node {
    Node::new(NodeKind::ModelStorage {
        file_name: file_name.to_string(),
    })
}

/// Create a linear transform node translating by `offset`.
pub fn translation_node(offset: [f64; 3]) -> Node {
    let mut matrix = [0.0; 16];
    for i in 0..4 {
        matrix[i * 5] = 1.0;
    }
    matrix[3] = offset[0];
    matrix[7] = offset[1];
    matrix[11] = offset[2];
    Node::new(NodeKind::LinearTransform { matrix })
}

/// Create the interaction singleton in a given mode.
pub fn interaction_node(mode: InteractionMode) -> Node {
    Node::new(NodeKind::Interaction {
        mode,
        place_persistence: false,
    })
}

// ── Scene factories ─────────────────────────────────────────────

/// IDs of a model with its display and storage nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTrio {
    pub model: NodeId,
    pub display: NodeId,
    pub storage: NodeId,
}

/// Add a model named `name` with a display and a storage node.
pub fn add_model_trio(scene: &mut Scene, name: &str) -> ModelTrio {
    let display = scene.add_node(display_node([0.9, 0.8, 0.7]));
    let storage = scene.add_node(storage_node(&format!("{name}.vtk")));
    let model = scene.add_node(
        model_node()
            .with_name(name)
            .with_reference("display", &display)
            .with_reference("storage", &storage),
    );
    ModelTrio {
        model,
        display,
        storage,
    }
}

/// Scene holding `count` model trios named `Model0`, `Model1`, ...
pub fn scene_with_models(count: usize) -> Scene {
    let mut scene = Scene::new();
    for i in 0..count {
        add_model_trio(&mut scene, &format!("Model{i}"));
    }
    scene
}

/// Scene document with one model trio, a camera and the interaction singleton.
pub fn sample_document() -> SceneDocument {
    SceneDocument {
        version: "Slicer4.4.0".to_string(),
        nodes: vec![
            NodeElement::new("ModelDisplay")
                .with_attribute("id", "vtkMRMLModelDisplayNode1")
                .with_attribute("color", "1 0 0"),
            NodeElement::new("ModelStorage")
                .with_attribute("id", "vtkMRMLModelStorageNode1")
                .with_attribute("fileName", "skull.vtk"),
            NodeElement::new("Model")
                .with_attribute("id", "vtkMRMLModelNode1")
                .with_attribute("name", "Skull")
                .with_attribute(
                    "references",
                    "display:vtkMRMLModelDisplayNode1;storage:vtkMRMLModelStorageNode1;",
                ),
            NodeElement::new("Camera").with_attribute("id", "vtkMRMLCameraNode1"),
            NodeElement::new("Interaction")
                .with_attribute("id", "vtkMRMLInteractionNodeSingleton")
                .with_attribute("singletonTag", "Singleton")
                .with_attribute("currentInteractionMode", "Place"),
        ],
    }
}

/// [`sample_document`] serialized.
pub fn sample_document_json() -> String {
    sample_document().to_json(true).unwrap_or_default()
}

/// Unique scene file path in the system temp directory.
pub fn temp_scene_path(label: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("mrml_{}_{}_{}.json", label, std::process::id(), n))
}
