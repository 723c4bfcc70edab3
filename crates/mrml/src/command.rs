//! JSON command protocol for driving a scene headlessly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scene::{node_summary, Scene};
use crate::state::SceneStateKind;

/// A command that can be executed against a scene.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SceneCommand {
    /// Create a node of a registered class and add it
    AddNode {
        class_name: String,
        #[serde(default)]
        name: Option<String>,
        /// Persisted field values, e.g. `{"opacity": "0.5"}`
        #[serde(default)]
        attributes: BTreeMap<String, String>,
    },
    /// Remove a node by ID
    RemoveNode {
        id: String,
    },
    /// Point a node's reference role at another node, or clear it
    SetReference {
        id: String,
        role: String,
        #[serde(default)]
        referenced: Option<String>,
    },
    /// Record an undo checkpoint.
    SaveState,
    /// Undo the last checkpoint.
    Undo,
    /// Redo the last undone checkpoint.
    Redo,
    /// Clear the scene.
    Clear {
        #[serde(default)]
        remove_singletons: bool,
    },
    /// Inspect the scene: list all nodes.
    Inspect,
    /// Export the scene document as JSON.
    ExportScene,
    /// Merge a scene document into the scene.
    ImportScene {
        scene_json: String,
    },
    StartState {
        state: SceneStateKind,
    },
    EndState {
        state: SceneStateKind,
    },
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Execute a single command on the scene.
pub fn execute_command(scene: &mut Scene, cmd: SceneCommand) -> CommandResponse {
    match cmd {
        SceneCommand::AddNode {
            class_name,
            name,
            attributes,
        } => {
            let mut node = match scene.create_node_by_class(&class_name) {
                Ok(node) => node,
                Err(e) => return CommandResponse::err(e.to_string()),
            };
            if let Err(e) = node.read_attributes(&attributes) {
                return CommandResponse::err(e.to_string());
            }
            if name.is_some() {
                node.name = name;
            }
            scene.save_state_for_undo();
            let id = scene.add_node(node);
            CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
        }

        SceneCommand::RemoveNode { id } => {
            if !scene.is_node_present(&id) {
                return CommandResponse::ok_with_data(serde_json::json!({ "removed": false }));
            }
            scene.save_state_for_undo();
            let removed = scene.remove_node(&id).is_ok();
            CommandResponse::ok_with_data(serde_json::json!({ "removed": removed }))
        }

        SceneCommand::SetReference {
            id,
            role,
            referenced,
        } => {
            if scene.is_node_present(&id) {
                scene.save_state_for_node_undo(&id);
            }
            match scene.set_node_reference_id(&id, &role, referenced.as_deref()) {
                Ok(()) => CommandResponse::ok(),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        SceneCommand::SaveState => {
            scene.save_state_for_undo();
            CommandResponse::ok_with_data(
                serde_json::json!({ "undo_levels": scene.number_of_undo_levels() }),
            )
        }

        SceneCommand::Undo => {
            let success = scene.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        SceneCommand::Redo => {
            let success = scene.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        SceneCommand::Clear { remove_singletons } => {
            scene.clear(remove_singletons);
            CommandResponse::ok()
        }

        SceneCommand::Inspect => {
            let nodes: Vec<serde_json::Value> = scene.nodes().map(node_summary).collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "node_count": nodes.len(),
                "nodes": nodes,
                "reference_count": scene.number_of_node_references(),
                "undo_levels": scene.number_of_undo_levels(),
                "redo_levels": scene.number_of_redo_levels(),
                "states": scene.states(),
            }))
        }

        SceneCommand::ExportScene => {
            match scene
                .to_document()
                .to_json(scene.settings().pretty_documents)
            {
                Ok(json) => CommandResponse::ok_with_data(serde_json::json!({ "scene_json": json })),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        SceneCommand::ImportScene { scene_json } => {
            let saved = scene.scene_string().to_string();
            scene.set_scene_string(scene_json);
            scene.set_load_from_string(true);
            let before = scene.number_of_nodes();
            let result = scene.import(None);
            scene.set_load_from_string(false);
            scene.set_scene_string(saved);
            match result {
                Ok(()) => CommandResponse::ok_with_data(serde_json::json!({
                    "imported": scene.number_of_nodes() - before,
                })),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        SceneCommand::StartState { state } => {
            scene.start_state(state);
            CommandResponse::ok_with_data(serde_json::json!({ "states": scene.states() }))
        }

        SceneCommand::EndState { state } => match scene.end_state(state) {
            Ok(()) => CommandResponse::ok_with_data(serde_json::json!({ "states": scene.states() })),
            Err(e) => CommandResponse::err(e.to_string()),
        },
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(scene: &mut Scene, json: &str) -> Result<CommandResponse, String> {
    let cmd: SceneCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(scene, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(scene: &mut Scene, json: &str) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<SceneCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(scene, cmd))
        .collect())
}
