//! Scene state transitions

use crate::error::SceneResult;
use crate::state::SceneStateKind;

use super::Scene;

impl Scene {
    /// Enter a state, firing start events on the outermost transition
    pub fn start_state(&mut self, state: SceneStateKind) {
        let events = self.states.start(state);
        self.emit_all(events);
    }

    /// Leave a state, firing end events once it is no longer active.
    /// A state that was never started is logged and ignored.
    pub fn end_state(&mut self, state: SceneStateKind) -> SceneResult<()> {
        match self.states.end(state) {
            Ok(events) => {
                self.emit_all(events);
                Ok(())
            }
            Err(e) => {
                tracing::error!("{e}");
                Err(e)
            }
        }
    }

    /// Report progress of an active state (and of BatchProcess when implied)
    pub fn progress_state(&mut self, state: SceneStateKind, progress: u32) {
        let events = self.states.progress(state, progress);
        self.emit_all(events);
    }

    /// Union of the flags of every active state
    pub fn states(&self) -> u32 {
        self.states.states()
    }

    pub fn is_batch_processing(&self) -> bool {
        self.states.is_active(SceneStateKind::BatchProcess)
    }

    pub fn is_closing(&self) -> bool {
        self.states.is_active(SceneStateKind::Close)
    }

    pub fn is_importing(&self) -> bool {
        self.states.is_active(SceneStateKind::Import)
    }

    pub fn is_restoring(&self) -> bool {
        self.states.is_active(SceneStateKind::Restore)
    }

    pub fn is_saving(&self) -> bool {
        self.states.is_active(SceneStateKind::Save)
    }
}
