use colorcube_engine_interface::prelude::*;
use serde::{Deserialize, Serialize};

use crate::render::Shape;

/// Collider used for pointer hit-testing and physics. Matches the shape of the mesh by default.
#[derive(Component, Serialize, Deserialize, Default, Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct MeshCollider {
    pub shape: Shape,
}

impl MeshCollider {
    pub fn cube() -> Self {
        Self { shape: Shape::Box }
    }
}
