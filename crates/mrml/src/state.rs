//! Nested scene states
//!
//! Each start pushes a state, each end pops one. Start/end events fire only on
//! the outermost transition of a state, and the batch-process pair wraps every
//! state that implies batch processing.

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::event::SceneEvent;

const BATCH_PROCESS_FLAG: u32 = 0x0001;

/// A scene state. Close, Import and Restore imply BatchProcess; Save does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneStateKind {
    BatchProcess,
    Close,
    Import,
    Restore,
    Save,
}

impl SceneStateKind {
    /// Bit flags, including the implied BatchProcess bit
    pub const fn flags(self) -> u32 {
        match self {
            SceneStateKind::BatchProcess => BATCH_PROCESS_FLAG,
            SceneStateKind::Close => 0x0002 | BATCH_PROCESS_FLAG,
            SceneStateKind::Import => 0x0004 | BATCH_PROCESS_FLAG,
            SceneStateKind::Restore => 0x0008 | BATCH_PROCESS_FLAG,
            SceneStateKind::Save => 0x0010,
        }
    }

    pub const fn implies_batch_process(self) -> bool {
        self.flags() & BATCH_PROCESS_FLAG != 0
    }

    pub fn name(self) -> &'static str {
        match self {
            SceneStateKind::BatchProcess => "BatchProcess",
            SceneStateKind::Close => "Close",
            SceneStateKind::Import => "Import",
            SceneStateKind::Restore => "Restore",
            SceneStateKind::Save => "Save",
        }
    }
}

impl std::fmt::Display for SceneStateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stack of active states
#[derive(Debug, Clone, Default)]
pub struct StateStack {
    stack: Vec<SceneStateKind>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of the flags of every active state; 0 when idle
    pub fn states(&self) -> u32 {
        self.stack.iter().fold(0, |acc, s| acc | s.flags())
    }

    pub fn is_active(&self, kind: SceneStateKind) -> bool {
        self.states() & kind.flags() == kind.flags()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Push `kind` and return the events the transition fires
    pub fn start(&mut self, kind: SceneStateKind) -> Vec<SceneEvent> {
        let was_batch_processing = self.is_active(SceneStateKind::BatchProcess);
        let was_in_state = self.is_active(kind);
        self.stack.push(kind);

        let mut events = Vec::new();
        if !was_batch_processing && kind.implies_batch_process() {
            events.push(SceneEvent::StartState(SceneStateKind::BatchProcess));
        }
        if !was_in_state && kind != SceneStateKind::BatchProcess {
            events.push(SceneEvent::StartState(kind));
        }
        events
    }

    /// Pop `kind` and return the events the transition fires.
    ///
    /// If `kind` is not the innermost state the most recent matching entry is
    /// removed instead and the mismatch is logged. Ending a state that is not
    /// on the stack at all is an error and changes nothing.
    pub fn end(&mut self, kind: SceneStateKind) -> SceneResult<Vec<SceneEvent>> {
        let Some(index) = self.stack.iter().rposition(|s| *s == kind) else {
            return Err(SceneError::StateMismatch {
                expected: kind.to_string(),
                found: self
                    .stack
                    .last()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            });
        };
        if index + 1 != self.stack.len() {
            tracing::error!(
                "end_state({}) does not match innermost state {}",
                kind,
                self.stack[self.stack.len() - 1]
            );
        }
        self.stack.remove(index);

        let mut events = Vec::new();
        if !self.is_active(kind) && kind != SceneStateKind::BatchProcess {
            events.push(SceneEvent::EndState(kind));
        }
        if kind.implies_batch_process() && !self.is_active(SceneStateKind::BatchProcess) {
            events.push(SceneEvent::EndState(SceneStateKind::BatchProcess));
        }
        Ok(events)
    }

    /// Progress events for `kind`, if it is active. States that imply
    /// BatchProcess report the same progress for it as well.
    pub fn progress(&self, kind: SceneStateKind, progress: u32) -> Vec<SceneEvent> {
        if !self.is_active(kind) {
            return Vec::new();
        }
        let mut events = vec![SceneEvent::ProgressState(kind, progress)];
        if kind != SceneStateKind::BatchProcess && kind.implies_batch_process() {
            events.push(SceneEvent::ProgressState(SceneStateKind::BatchProcess, progress));
        }
        events
    }
}
