// Library crate: the scene graph plus the command protocol and fixtures used by
// the binary and the integration tests.

pub mod collection;
pub mod command;
pub mod error;
pub mod event;
pub mod fixtures;
pub mod node;
pub mod references;
pub mod registry;
pub mod scene;
pub mod settings;
pub mod state;
pub mod sync;

pub use error::{SceneError, SceneResult};
pub use event::{EventKind, ObserverId, SceneEvent};
pub use node::{InteractionMode, Node, NodeKind};
pub use scene::Scene;
pub use settings::SceneSettings;
pub use state::SceneStateKind;
