use colorcube_engine_interface::prelude::*;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// # Component representing position and orientation
///
/// Represents a rotation, followed by a translation.
#[derive(Component, Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    /// Position
    pub pos: Vec3,
    /// Orientation (Rotation)
    pub orient: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transformation
    pub fn identity() -> Self {
        Self {
            pos: Vec3::ZERO,
            orient: Quat::IDENTITY,
        }
    }

    /// Identity orientation at the given position
    pub fn from_position(pos: Vec3) -> Self {
        Self::identity().with_position(pos)
    }

    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.pos = pos;
        self
    }
}
