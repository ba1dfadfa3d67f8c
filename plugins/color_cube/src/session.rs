use colorcube_engine_interface::prelude::EntityId;

/// Where the session is in its lifecycle. `Waiting` moves to exactly one of the other two,
/// and never back.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No cube yet; counting frames spent unsynchronized
    Waiting { frames: u64 },
    /// Cube created while the host reported the session synchronized
    Synced(EntityId),
    /// Cube created locally after giving up on synchronization
    Fallback(EntityId),
}

/// Per-session scene state. Created at scene start and dropped with the scene.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) color_index: usize,
    pub(crate) phase: Phase,
    /// Seconds spent waiting for synchronization
    pub(crate) waited: f32,
}

impl Session {
    pub fn new() -> Self {
        Self {
            color_index: 0,
            phase: Phase::Waiting { frames: 0 },
            waited: 0.,
        }
    }

    /// Current palette index
    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The cube, if it has been created
    pub fn cube(&self) -> Option<EntityId> {
        match self.phase {
            Phase::Waiting { .. } => None,
            Phase::Synced(e) | Phase::Fallback(e) => Some(e),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
