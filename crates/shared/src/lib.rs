use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier of a node in a scene
pub type NodeId = String;

/// Reference role name (e.g. "display", "storage")
pub type ReferenceRole = String;

/// Role-keyed node references, as stored on a node
pub type NodeReferences = BTreeMap<ReferenceRole, Vec<NodeId>>;

/// Scene format version written by this library
pub const CURRENT_MRML_VERSION: &str = "Slicer4.4.0";

fn default_version() -> String {
    CURRENT_MRML_VERSION.to_string()
}

/// One persisted node: its registered tag plus its fields encoded as strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeElement {
    /// Registered tag name (e.g. "Model", "ModelDisplay")
    pub tag: String,
    /// Node fields, including `id`, `name` and `references`
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl NodeElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get an attribute value
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Persisted node ID, if any
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").filter(|id| !id.is_empty())
    }
}

/// Persisted scene: the root element holding one element per node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Version of the software that wrote the document
    #[serde(default = "default_version")]
    pub version: String,
    /// Nodes in scene order
    #[serde(default)]
    pub nodes: Vec<NodeElement>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            nodes: Vec::new(),
        }
    }
}

impl SceneDocument {
    /// Parse a document from its string form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the document
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Encode references as `role:ID1 ID2;role2:ID3;`
pub fn encode_references(references: &NodeReferences) -> String {
    let mut out = String::new();
    for (role, ids) in references {
        if ids.is_empty() {
            continue;
        }
        out.push_str(role);
        out.push(':');
        out.push_str(&ids.join(" "));
        out.push(';');
    }
    out
}

/// Decode the `role:ID1 ID2;` form. Segments without a role are ignored.
pub fn decode_references(encoded: &str) -> NodeReferences {
    let mut references = NodeReferences::new();
    for segment in encoded.split(';') {
        let Some((role, ids)) = segment.split_once(':') else {
            continue;
        };
        let role = role.trim();
        if role.is_empty() {
            continue;
        }
        let ids: Vec<NodeId> = ids.split_whitespace().map(str::to_string).collect();
        if ids.is_empty() {
            continue;
        }
        references.entry(role.to_string()).or_default().extend(ids);
    }
    references
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_element_builder() {
        let el = NodeElement::new("Model")
            .with_attribute("id", "ModelNode1")
            .with_attribute("name", "Model");
        assert_eq!(el.id(), Some("ModelNode1"));
        assert_eq!(el.attribute("name"), Some("Model"));
        assert_eq!(el.attribute("missing"), None);
    }

    #[test]
    fn test_empty_id_is_none() {
        let el = NodeElement::new("Model").with_attribute("id", "");
        assert_eq!(el.id(), None);
    }

    #[test]
    fn test_document_default_version() {
        let doc: SceneDocument = serde_json::from_str(r#"{"nodes": []}"#).unwrap();
        assert_eq!(doc.version, CURRENT_MRML_VERSION);
        assert!(doc.nodes.is_empty());
    }

    #[test]
    fn test_document_json_shape() {
        let doc = SceneDocument {
            version: "Slicer4.4.0".to_string(),
            nodes: vec![NodeElement::new("Camera").with_attribute("id", "CameraNode1")],
        };
        let json = doc.to_json(false).unwrap();
        assert!(json.contains(r#""tag":"Camera""#));
        assert!(json.contains(r#""id":"CameraNode1""#));

        let back = SceneDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_document_rejects_garbage() {
        assert!(SceneDocument::from_json("<MRML></MRML>").is_err());
        assert!(SceneDocument::from_json(r#"{"nodes": [{"attributes": {}}]}"#).is_err());
    }

    #[test]
    fn test_encode_references() {
        let mut refs = NodeReferences::new();
        refs.insert("display".to_string(), vec!["D1".to_string(), "D2".to_string()]);
        refs.insert("storage".to_string(), vec!["S1".to_string()]);
        refs.insert("empty".to_string(), vec![]);
        assert_eq!(encode_references(&refs), "display:D1 D2;storage:S1;");
    }

    #[test]
    fn test_decode_references() {
        let refs = decode_references("display:D1 D2;storage:S1;");
        assert_eq!(refs["display"], vec!["D1", "D2"]);
        assert_eq!(refs["storage"], vec!["S1"]);
    }

    #[test]
    fn test_decode_references_tolerates_noise() {
        let refs = decode_references(" ;:orphan;transform:  T1  ;display:;");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs["transform"], vec!["T1"]);
        assert!(decode_references("").is_empty());
    }
}
