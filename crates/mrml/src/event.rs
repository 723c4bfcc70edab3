//! Scene events and observer dispatch
//!
//! Observers are plain callbacks receiving the event by reference. They run
//! synchronously, in registration order, on the thread mutating the scene.

use shared::NodeId;

use crate::state::SceneStateKind;

/// Something that happened to the scene
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    NodeAboutToBeAdded {
        id: NodeId,
        class_name: &'static str,
    },
    NodeAdded {
        id: NodeId,
        class_name: &'static str,
    },
    NodeAboutToBeRemoved {
        id: NodeId,
        class_name: &'static str,
    },
    NodeRemoved {
        id: NodeId,
        class_name: &'static str,
    },
    /// Node content replaced in place (singleton overwrite, undo restore, reset)
    NodeModified {
        id: NodeId,
        class_name: &'static str,
    },
    StartState(SceneStateKind),
    EndState(SceneStateKind),
    ProgressState(SceneStateKind, u32),
    /// The scene was cleared
    NewScene,
}

/// Discriminant of [`SceneEvent`], used to filter observers
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EventKind {
    NodeAboutToBeAdded,
    NodeAdded,
    NodeAboutToBeRemoved,
    NodeRemoved,
    NodeModified,
    StartState,
    EndState,
    ProgressState,
    NewScene,
}

impl SceneEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NodeAboutToBeAdded { .. } => EventKind::NodeAboutToBeAdded,
            Self::NodeAdded { .. } => EventKind::NodeAdded,
            Self::NodeAboutToBeRemoved { .. } => EventKind::NodeAboutToBeRemoved,
            Self::NodeRemoved { .. } => EventKind::NodeRemoved,
            Self::NodeModified { .. } => EventKind::NodeModified,
            Self::StartState(_) => EventKind::StartState,
            Self::EndState(_) => EventKind::EndState,
            Self::ProgressState(..) => EventKind::ProgressState,
            Self::NewScene => EventKind::NewScene,
        }
    }

    /// Node ID for per-node events
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::NodeAboutToBeAdded { id, .. }
            | Self::NodeAdded { id, .. }
            | Self::NodeAboutToBeRemoved { id, .. }
            | Self::NodeRemoved { id, .. }
            | Self::NodeModified { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Node class for per-node events
    pub fn class_name(&self) -> Option<&'static str> {
        match self {
            Self::NodeAboutToBeAdded { class_name, .. }
            | Self::NodeAdded { class_name, .. }
            | Self::NodeAboutToBeRemoved { class_name, .. }
            | Self::NodeRemoved { class_name, .. }
            | Self::NodeModified { class_name, .. } => Some(class_name),
            _ => None,
        }
    }
}

/// Unique identifier for a registered observer
pub type ObserverId = u32;

type SceneCallback = Box<dyn FnMut(&SceneEvent)>;

/// Registered observers, optionally filtered by [`EventKind`]
pub struct EventDispatcher {
    observers: Vec<(ObserverId, Option<EventKind>, SceneCallback)>,
    next_id: ObserverId,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 0,
        }
    }

    /// Observe one kind of event
    pub fn register<F>(&mut self, kind: EventKind, callback: F) -> ObserverId
    where
        F: FnMut(&SceneEvent) + 'static,
    {
        self.push(Some(kind), Box::new(callback))
    }

    /// Observe every event
    pub fn register_all<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&SceneEvent) + 'static,
    {
        self.push(None, Box::new(callback))
    }

    fn push(&mut self, kind: Option<EventKind>, callback: SceneCallback) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.observers.push((id, kind, callback));
        id
    }

    /// Returns `true` if the observer was found and removed
    pub fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn dispatch(&mut self, event: &SceneEvent) {
        let kind = event.kind();
        for (_, filter, callback) in self.observers.iter_mut() {
            if filter.map_or(true, |f| f == kind) {
                callback(event);
            }
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("observers", &self.observers.len())
            .finish()
    }
}
