//! Pointer input. Plugins register interest in an entity with [OnPointerDown]; the host then
//! hit-tests and sends a [PointerDown] for each matching press.
use colorcube_engine_interface::prelude::*;
use serde::{Deserialize, Serialize};

/// Input buttons
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum InputAction {
    /// Usually the left mouse button, or the trigger on a controller
    Primary,
    Secondary,
    Pointer,
}

/// Request from a plugin for pointer-down events on `entity`
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[locality("Local")]
pub struct OnPointerDown {
    pub entity: EntityId,
    pub button: InputAction,
    /// Shown by the host while hovering the entity
    pub hover_text: String,
}

/// A button was pressed while pointing at `entity`
#[derive(Message, Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[locality("Local")]
pub struct PointerDown {
    pub entity: EntityId,
    pub button: InputAction,
}

impl OnPointerDown {
    pub fn new(entity: EntityId, button: InputAction, hover_text: impl Into<String>) -> Self {
        Self {
            entity,
            button,
            hover_text: hover_text.into(),
        }
    }

    /// Whether the given press should be forwarded to the requesting plugin
    pub fn matches(&self, event: &PointerDown) -> bool {
        self.entity == event.entity && self.button == event.button
    }
}
