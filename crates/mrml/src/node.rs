//! Scene nodes
//!
//! A node is a common header (ID, name, flags, free-form attributes, role-keyed
//! references) plus a [`NodeKind`] payload. Node classes form a shallow
//! hierarchy so that class queries such as "all display nodes" work.

use std::collections::BTreeMap;

use shared::{decode_references, encode_references, NodeId, NodeReferences};

use crate::error::{SceneError, SceneResult};

/// Singleton tag used by the built-in singleton classes
pub const DEFAULT_SINGLETON_TAG: &str = "Singleton";

/// Mouse interaction mode stored by the interaction node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    ViewTransform,
    Place,
}

impl InteractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::ViewTransform => "ViewTransform",
            InteractionMode::Place => "Place",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ViewTransform" => Some(InteractionMode::ViewTransform),
            "Place" => Some(InteractionMode::Place),
            _ => None,
        }
    }
}

/// Typed payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Surface model; geometry lives in storage, appearance in display nodes
    Model,
    ModelDisplay {
        color: [f64; 3],
        opacity: f64,
        visibility: bool,
        scalar_visibility: bool,
    },
    ModelStorage {
        file_name: String,
    },
    /// Row-major 4x4 matrix
    LinearTransform {
        matrix: [f64; 16],
    },
    Camera {
        position: [f64; 3],
        focal_point: [f64; 3],
        view_up: [f64; 3],
        view_angle: f64,
    },
    Selection {
        active_place_node_class: String,
    },
    Interaction {
        mode: InteractionMode,
        place_persistence: bool,
    },
    /// Parameter node of a scripted module
    ScriptedModule {
        module_name: String,
        parameters: BTreeMap<String, String>,
    },
}

const IDENTITY: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

impl NodeKind {
    pub fn model_display() -> Self {
        NodeKind::ModelDisplay {
            color: [0.5, 0.5, 0.5],
            opacity: 1.0,
            visibility: true,
            scalar_visibility: false,
        }
    }

    pub fn model_storage() -> Self {
        NodeKind::ModelStorage {
            file_name: String::new(),
        }
    }

    pub fn linear_transform() -> Self {
        NodeKind::LinearTransform { matrix: IDENTITY }
    }

    pub fn camera() -> Self {
        NodeKind::Camera {
            position: [0.0, 500.0, 0.0],
            focal_point: [0.0, 0.0, 0.0],
            view_up: [0.0, 0.0, 1.0],
            view_angle: 30.0,
        }
    }

    pub fn selection() -> Self {
        NodeKind::Selection {
            active_place_node_class: "MarkupsFiducialNode".to_string(),
        }
    }

    pub fn interaction() -> Self {
        NodeKind::Interaction {
            mode: InteractionMode::ViewTransform,
            place_persistence: false,
        }
    }

    pub fn scripted_module() -> Self {
        NodeKind::ScriptedModule {
            module_name: String::new(),
            parameters: BTreeMap::new(),
        }
    }

    /// One constructor-state instance of every kind
    pub fn all() -> Vec<NodeKind> {
        vec![
            NodeKind::Model,
            NodeKind::model_display(),
            NodeKind::model_storage(),
            NodeKind::linear_transform(),
            NodeKind::camera(),
            NodeKind::selection(),
            NodeKind::interaction(),
            NodeKind::scripted_module(),
        ]
    }

    /// Constructor state of the same variant
    pub fn fresh(&self) -> Self {
        match self {
            NodeKind::Model => NodeKind::Model,
            NodeKind::ModelDisplay { .. } => NodeKind::model_display(),
            NodeKind::ModelStorage { .. } => NodeKind::model_storage(),
            NodeKind::LinearTransform { .. } => NodeKind::linear_transform(),
            NodeKind::Camera { .. } => NodeKind::camera(),
            NodeKind::Selection { .. } => NodeKind::selection(),
            NodeKind::Interaction { .. } => NodeKind::interaction(),
            NodeKind::ScriptedModule { .. } => NodeKind::scripted_module(),
        }
    }

    pub fn class_name(&self) -> &'static str {
        self.class_hierarchy()[0]
    }

    /// Class names from most to least specific
    pub fn class_hierarchy(&self) -> &'static [&'static str] {
        match self {
            NodeKind::Model => &["ModelNode", "DisplayableNode", "StorableNode", "Node"],
            NodeKind::ModelDisplay { .. } => &["ModelDisplayNode", "DisplayNode", "Node"],
            NodeKind::ModelStorage { .. } => &["ModelStorageNode", "StorageNode", "Node"],
            NodeKind::LinearTransform { .. } => &[
                "LinearTransformNode",
                "TransformNode",
                "DisplayableNode",
                "StorableNode",
                "Node",
            ],
            NodeKind::Camera { .. } => &["CameraNode", "Node"],
            NodeKind::Selection { .. } => &["SelectionNode", "Node"],
            NodeKind::Interaction { .. } => &["InteractionNode", "Node"],
            NodeKind::ScriptedModule { .. } => &["ScriptedModuleNode", "Node"],
        }
    }

    /// Hierarchy of a built-in class, looked up by its class name
    pub fn hierarchy_of(class_name: &str) -> Option<&'static [&'static str]> {
        NodeKind::all()
            .into_iter()
            .map(|kind| kind.class_hierarchy())
            .find(|hierarchy| hierarchy[0] == class_name)
    }

    /// Default persisted tag, also the base of generated names
    pub fn tag_name(&self) -> &'static str {
        match self {
            NodeKind::Model => "Model",
            NodeKind::ModelDisplay { .. } => "ModelDisplay",
            NodeKind::ModelStorage { .. } => "ModelStorage",
            NodeKind::LinearTransform { .. } => "LinearTransform",
            NodeKind::Camera { .. } => "Camera",
            NodeKind::Selection { .. } => "Selection",
            NodeKind::Interaction { .. } => "Interaction",
            NodeKind::ScriptedModule { .. } => "ScriptedModule",
        }
    }

    fn default_singleton_tag(&self) -> Option<String> {
        match self {
            NodeKind::Selection { .. } | NodeKind::Interaction { .. } => {
                Some(DEFAULT_SINGLETON_TAG.to_string())
            }
            _ => None,
        }
    }

    fn write_fields(&self, out: &mut BTreeMap<String, String>) {
        match self {
            NodeKind::Model => {}
            NodeKind::ModelDisplay {
                color,
                opacity,
                visibility,
                scalar_visibility,
            } => {
                out.insert("color".into(), format_floats(color));
                out.insert("opacity".into(), opacity.to_string());
                out.insert("visibility".into(), visibility.to_string());
                out.insert("scalarVisibility".into(), scalar_visibility.to_string());
            }
            NodeKind::ModelStorage { file_name } => {
                out.insert("fileName".into(), file_name.clone());
            }
            NodeKind::LinearTransform { matrix } => {
                out.insert("matrixTransformToParent".into(), format_floats(matrix));
            }
            NodeKind::Camera {
                position,
                focal_point,
                view_up,
                view_angle,
            } => {
                out.insert("position".into(), format_floats(position));
                out.insert("focalPoint".into(), format_floats(focal_point));
                out.insert("viewUp".into(), format_floats(view_up));
                out.insert("viewAngle".into(), view_angle.to_string());
            }
            NodeKind::Selection {
                active_place_node_class,
            } => {
                out.insert(
                    "activePlaceNodeClassName".into(),
                    active_place_node_class.clone(),
                );
            }
            NodeKind::Interaction {
                mode,
                place_persistence,
            } => {
                out.insert("currentInteractionMode".into(), mode.as_str().to_string());
                out.insert("placeModePersistence".into(), place_persistence.to_string());
            }
            NodeKind::ScriptedModule {
                module_name,
                parameters,
            } => {
                out.insert("moduleName".into(), module_name.clone());
                out.insert("parameters".into(), encode_map(parameters));
            }
        }
    }

    /// Missing keys keep their current value
    fn read_fields(&mut self, attrs: &BTreeMap<String, String>) -> SceneResult<()> {
        match self {
            NodeKind::Model => {}
            NodeKind::ModelDisplay {
                color,
                opacity,
                visibility,
                scalar_visibility,
            } => {
                if let Some(v) = attrs.get("color") {
                    *color = parse_floats("color", v)?;
                }
                if let Some(v) = attrs.get("opacity") {
                    *opacity = parse_float("opacity", v)?;
                }
                if let Some(v) = attrs.get("visibility") {
                    *visibility = parse_bool("visibility", v)?;
                }
                if let Some(v) = attrs.get("scalarVisibility") {
                    *scalar_visibility = parse_bool("scalarVisibility", v)?;
                }
            }
            NodeKind::ModelStorage { file_name } => {
                if let Some(v) = attrs.get("fileName") {
                    *file_name = v.clone();
                }
            }
            NodeKind::LinearTransform { matrix } => {
                if let Some(v) = attrs.get("matrixTransformToParent") {
                    *matrix = parse_floats("matrixTransformToParent", v)?;
                }
            }
            NodeKind::Camera {
                position,
                focal_point,
                view_up,
                view_angle,
            } => {
                if let Some(v) = attrs.get("position") {
                    *position = parse_floats("position", v)?;
                }
                if let Some(v) = attrs.get("focalPoint") {
                    *focal_point = parse_floats("focalPoint", v)?;
                }
                if let Some(v) = attrs.get("viewUp") {
                    *view_up = parse_floats("viewUp", v)?;
                }
                if let Some(v) = attrs.get("viewAngle") {
                    *view_angle = parse_float("viewAngle", v)?;
                }
            }
            NodeKind::Selection {
                active_place_node_class,
            } => {
                if let Some(v) = attrs.get("activePlaceNodeClassName") {
                    *active_place_node_class = v.clone();
                }
            }
            NodeKind::Interaction {
                mode,
                place_persistence,
            } => {
                if let Some(v) = attrs.get("currentInteractionMode") {
                    *mode = InteractionMode::parse(v).ok_or_else(|| invalid("currentInteractionMode", v))?;
                }
                if let Some(v) = attrs.get("placeModePersistence") {
                    *place_persistence = parse_bool("placeModePersistence", v)?;
                }
            }
            NodeKind::ScriptedModule {
                module_name,
                parameters,
            } => {
                if let Some(v) = attrs.get("moduleName") {
                    *module_name = v.clone();
                }
                if let Some(v) = attrs.get("parameters") {
                    *parameters = decode_map("parameters", v)?;
                }
            }
        }
        Ok(())
    }
}

/// A scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    pub name: Option<String>,
    pub description: String,
    pub hide_from_editors: bool,
    pub selectable: bool,
    /// Nodes with a singleton tag exist at most once per class and tag
    pub singleton_tag: Option<String>,
    /// Free-form user attributes
    pub attributes: BTreeMap<String, String>,
    references: NodeReferences,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: None,
            description: String::new(),
            hide_from_editors: false,
            selectable: true,
            singleton_tag: kind.default_singleton_tag(),
            attributes: BTreeMap::new(),
            references: NodeReferences::new(),
            kind,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Preset ID; the scene keeps it when adding if it is free
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_reference(mut self, role: impl Into<String>, id: impl Into<String>) -> Self {
        self.add_reference(&role.into(), &id.into());
        self
    }

    pub fn with_singleton_tag(mut self, tag: impl Into<String>) -> Self {
        self.singleton_tag = Some(tag.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide_from_editors = true;
        self
    }

    /// Scene-assigned ID; empty until the node is added
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn node_tag_name(&self) -> &'static str {
        self.kind.tag_name()
    }

    /// True if this node's class is `class_name` or derives from it
    pub fn is_a(&self, class_name: &str) -> bool {
        self.kind.class_hierarchy().contains(&class_name)
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton_tag.is_some()
    }

    /// Blank node of the same class
    pub fn new_instance(&self) -> Node {
        Node::new(self.kind.fresh())
    }

    // ── References ────────────────────────────────────────────

    pub fn references(&self) -> &NodeReferences {
        &self.references
    }

    /// First referenced ID for a role
    pub fn node_reference_id(&self, role: &str) -> Option<&str> {
        self.references
            .get(role)
            .and_then(|ids| ids.first())
            .map(String::as_str)
    }

    pub fn node_reference_ids(&self, role: &str) -> &[NodeId] {
        self.references.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every distinct ID this node references, in role order
    pub fn referenced_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = Vec::new();
        for id in self.references.values().flatten() {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }

    pub fn references_id(&self, id: &str) -> bool {
        self.references.values().flatten().any(|r| r == id)
    }

    pub(crate) fn set_reference(&mut self, role: &str, id: Option<&str>) -> Vec<NodeId> {
        let previous = self.references.remove(role).unwrap_or_default();
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            self.references.insert(role.to_string(), vec![id.to_string()]);
        }
        previous
    }

    pub(crate) fn add_reference(&mut self, role: &str, id: &str) {
        if id.is_empty() {
            return;
        }
        let ids = self.references.entry(role.to_string()).or_default();
        if !ids.iter().any(|r| r == id) {
            ids.push(id.to_string());
        }
    }

    pub(crate) fn remove_references(&mut self, role: &str) -> Vec<NodeId> {
        self.references.remove(role).unwrap_or_default()
    }

    /// Rewrite references to `old_id`; `None` drops them. Returns true if changed.
    pub(crate) fn update_reference_id(&mut self, old_id: &str, new_id: Option<&str>) -> bool {
        let mut changed = false;
        for ids in self.references.values_mut() {
            match new_id {
                Some(new_id) => {
                    for id in ids.iter_mut().filter(|id| id.as_str() == old_id) {
                        *id = new_id.to_string();
                        changed = true;
                    }
                }
                None => {
                    let before = ids.len();
                    ids.retain(|id| id != old_id);
                    changed |= ids.len() != before;
                }
            }
        }
        self.references.retain(|_, ids| !ids.is_empty());
        changed
    }

    // ── Copy / reset ──────────────────────────────────────────

    /// Copy everything but the ID. The name is copied only if `other` has one.
    pub fn copy_content(&mut self, other: &Node) {
        if other.name.is_some() {
            self.name = other.name.clone();
        }
        self.description = other.description.clone();
        self.hide_from_editors = other.hide_from_editors;
        self.selectable = other.selectable;
        self.singleton_tag = other.singleton_tag.clone();
        self.attributes = other.attributes.clone();
        self.references = other.references.clone();
        self.kind = other.kind.clone();
    }

    /// Back to constructor state (seeded from `default` if given).
    /// ID, name and singleton tag survive.
    pub fn reset(&mut self, default: Option<&Node>) {
        let id = std::mem::take(&mut self.id);
        let name = self.name.take();
        let singleton_tag = self.singleton_tag.take();

        let mut fresh = self.new_instance();
        if let Some(default) = default {
            fresh.copy_content(default);
        }
        *self = fresh;

        self.id = id;
        self.name = name;
        self.singleton_tag = singleton_tag;
    }

    // ── Attribute codec ───────────────────────────────────────

    /// Encode every field as a string attribute
    pub fn write_attributes(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        out.insert("id".into(), self.id.clone());
        if let Some(name) = &self.name {
            out.insert("name".into(), name.clone());
        }
        if !self.description.is_empty() {
            out.insert("description".into(), self.description.clone());
        }
        out.insert("hideFromEditors".into(), self.hide_from_editors.to_string());
        out.insert("selectable".into(), self.selectable.to_string());
        if let Some(tag) = &self.singleton_tag {
            out.insert("singletonTag".into(), tag.clone());
        }
        if !self.attributes.is_empty() {
            out.insert("attributes".into(), encode_map(&self.attributes));
        }
        let references = encode_references(&self.references);
        if !references.is_empty() {
            out.insert("references".into(), references);
        }
        self.kind.write_fields(&mut out);
        out
    }

    /// Decode fields written by [`Node::write_attributes`]. Missing keys keep
    /// their current value.
    pub fn read_attributes(&mut self, attrs: &BTreeMap<String, String>) -> SceneResult<()> {
        if let Some(id) = attrs.get("id") {
            self.id = id.clone();
        }
        if let Some(name) = attrs.get("name") {
            self.name = Some(name.clone());
        }
        if let Some(description) = attrs.get("description") {
            self.description = description.clone();
        }
        if let Some(v) = attrs.get("hideFromEditors") {
            self.hide_from_editors = parse_bool("hideFromEditors", v)?;
        }
        if let Some(v) = attrs.get("selectable") {
            self.selectable = parse_bool("selectable", v)?;
        }
        if let Some(tag) = attrs.get("singletonTag") {
            self.singleton_tag = Some(tag.clone()).filter(|t| !t.is_empty());
        }
        if let Some(v) = attrs.get("attributes") {
            self.attributes = decode_map("attributes", v)?;
        }
        if let Some(v) = attrs.get("references") {
            self.references = decode_references(v);
        }
        self.kind.read_fields(attrs)
    }
}

fn invalid(key: &str, value: &str) -> SceneError {
    SceneError::InvalidAttribute {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn format_floats(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_float(key: &str, value: &str) -> SceneResult<f64> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_floats<const N: usize>(key: &str, value: &str) -> SceneResult<[f64; N]> {
    let parsed = value
        .split_whitespace()
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid(key, value))?;
    parsed.try_into().map_err(|_| invalid(key, value))
}

fn parse_bool(key: &str, value: &str) -> SceneResult<bool> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn encode_map(map: &BTreeMap<String, String>) -> String {
    serde_json::to_string(map).unwrap_or_default()
}

fn decode_map(key: &str, value: &str) -> SceneResult<BTreeMap<String, String>> {
    if value.is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(value).map_err(|_| invalid(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_metadata() {
        let display = Node::new(NodeKind::model_display());
        assert_eq!(display.class_name(), "ModelDisplayNode");
        assert_eq!(display.node_tag_name(), "ModelDisplay");
        assert!(display.is_a("DisplayNode"));
        assert!(display.is_a("Node"));
        assert!(!display.is_a("ModelNode"));
    }

    #[test]
    fn test_builtin_singletons() {
        assert!(Node::new(NodeKind::selection()).is_singleton());
        assert!(Node::new(NodeKind::interaction()).is_singleton());
        assert!(!Node::new(NodeKind::Model).is_singleton());
    }

    #[test]
    fn test_update_reference_id_rewrites() {
        let mut model = Node::new(NodeKind::Model)
            .with_reference("display", "D1")
            .with_reference("display", "D2");
        assert!(model.update_reference_id("D1", Some("D9")));
        assert_eq!(model.node_reference_ids("display"), ["D9", "D2"]);
        assert!(!model.update_reference_id("missing", Some("X")));
    }

    #[test]
    fn test_update_reference_id_drops_empty_roles() {
        let mut model = Node::new(NodeKind::Model).with_reference("storage", "S1");
        assert!(model.update_reference_id("S1", None));
        assert!(model.references().is_empty());
        assert_eq!(model.node_reference_id("storage"), None);
    }

    #[test]
    fn test_add_reference_is_idempotent() {
        let mut model = Node::new(NodeKind::Model);
        model.add_reference("display", "D1");
        model.add_reference("display", "D1");
        assert_eq!(model.node_reference_ids("display").len(), 1);
        assert_eq!(model.referenced_ids(), vec!["D1".to_string()]);
    }

    #[test]
    fn test_copy_content_keeps_id() {
        let mut target = Node::new(NodeKind::interaction()).with_name("Interaction");
        target.set_id("InteractionNodeSingleton");
        let mut source = Node::new(NodeKind::interaction());
        source.kind = NodeKind::Interaction {
            mode: InteractionMode::Place,
            place_persistence: true,
        };

        target.copy_content(&source);
        assert_eq!(target.id(), "InteractionNodeSingleton");
        assert_eq!(target.name(), Some("Interaction"));
        assert_eq!(target.kind, source.kind);
    }

    #[test]
    fn test_reset_keeps_identity() {
        let mut node = Node::new(NodeKind::model_display()).with_name("Display");
        node.set_id("ModelDisplayNode3");
        node.kind = NodeKind::ModelDisplay {
            color: [1.0, 0.0, 0.0],
            opacity: 0.2,
            visibility: false,
            scalar_visibility: true,
        };
        node.attributes.insert("k".into(), "v".into());

        node.reset(None);
        assert_eq!(node.id(), "ModelDisplayNode3");
        assert_eq!(node.name(), Some("Display"));
        assert_eq!(node.kind, NodeKind::model_display());
        assert!(node.attributes.is_empty());
    }

    #[test]
    fn test_attribute_codec_restores_fields() {
        let mut camera = Node::new(NodeKind::Camera {
            position: [1.5, 2.0, -3.0],
            focal_point: [0.0, 0.0, 0.0],
            view_up: [0.0, 1.0, 0.0],
            view_angle: 45.0,
        })
        .with_name("Camera")
        .with_reference("transform", "LinearTransformNode1");
        camera.set_id("CameraNode1");
        camera.attributes.insert("Note".into(), "a:b;c".into());

        let attrs = camera.write_attributes();
        assert_eq!(attrs["position"], "1.5 2 -3");
        assert_eq!(attrs["references"], "transform:LinearTransformNode1;");

        let mut loaded = Node::new(NodeKind::camera());
        loaded.read_attributes(&attrs).unwrap();
        assert_eq!(loaded, camera);
    }

    #[test]
    fn test_scripted_module_parameters() {
        let mut params = BTreeMap::new();
        params.insert("threshold".to_string(), "0.5".to_string());
        let node = Node::new(NodeKind::ScriptedModule {
            module_name: "Editor".into(),
            parameters: params,
        });
        let attrs = node.write_attributes();

        let mut loaded = Node::new(NodeKind::scripted_module());
        loaded.read_attributes(&attrs).unwrap();
        assert_eq!(loaded.kind, node.kind);
    }

    #[test]
    fn test_read_rejects_bad_values() {
        let mut display = Node::new(NodeKind::model_display());
        let mut attrs = BTreeMap::new();
        attrs.insert("opacity".to_string(), "opaque".to_string());
        assert_eq!(
            display.read_attributes(&attrs),
            Err(SceneError::InvalidAttribute {
                key: "opacity".into(),
                value: "opaque".into()
            })
        );

        let mut attrs = BTreeMap::new();
        attrs.insert("color".to_string(), "1 0".to_string());
        assert!(display.read_attributes(&attrs).is_err());

        let mut interaction = Node::new(NodeKind::interaction());
        let mut attrs = BTreeMap::new();
        attrs.insert("currentInteractionMode".to_string(), "Fly".to_string());
        assert!(interaction.read_attributes(&attrs).is_err());
    }

    #[test]
    fn test_fresh_resets_payload() {
        let kind = NodeKind::ModelStorage {
            file_name: "a.vtk".into(),
        };
        assert_eq!(kind.fresh(), NodeKind::model_storage());
        assert_eq!(NodeKind::all().len(), 8);
    }

    #[test]
    fn test_hierarchy_of() {
        let hierarchy = NodeKind::hierarchy_of("LinearTransformNode").unwrap();
        assert!(hierarchy.contains(&"DisplayableNode"));
        assert!(NodeKind::hierarchy_of("DisplayableNode").is_none());
    }
}
