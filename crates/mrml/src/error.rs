//! Scene error type

use shared::NodeId;

/// Result of a fallible scene operation
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors reported by scene operations
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// No node class registered under this class name
    UnregisteredClass(String),
    /// No node class registered under this tag
    UnknownTag(String),
    /// No node with this ID in the scene
    NodeNotFound(NodeId),
    /// A persisted attribute could not be decoded
    InvalidAttribute { key: String, value: String },
    /// Reading or writing the scene file failed
    Io(String),
    /// The scene document is malformed
    Parse(String),
    /// `end_state` did not match the innermost `start_state`
    StateMismatch { expected: String, found: String },
    /// Load or save requested without a URL
    NoUrl,
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::UnregisteredClass(class) => {
                write!(f, "Node class '{}' is not registered", class)
            }
            SceneError::UnknownTag(tag) => write!(f, "No node class registered for tag '{}'", tag),
            SceneError::NodeNotFound(id) => write!(f, "Node '{}' not found", id),
            SceneError::InvalidAttribute { key, value } => {
                write!(f, "Invalid value '{}' for attribute '{}'", value, key)
            }
            SceneError::Io(msg) => write!(f, "I/O error: {}", msg),
            SceneError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SceneError::StateMismatch { expected, found } => {
                write!(f, "Ending state {} while innermost state is {}", expected, found)
            }
            SceneError::NoUrl => write!(f, "No scene URL set"),
        }
    }
}

impl std::error::Error for SceneError {}

impl From<std::io::Error> for SceneError {
    fn from(err: std::io::Error) -> Self {
        SceneError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        SceneError::Parse(err.to_string())
    }
}
