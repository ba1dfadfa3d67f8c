//! Types describing how the host should draw an entity
use colorcube_engine_interface::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Color4;

/// Built-in mesh shapes
#[derive(Serialize, Deserialize, Default, Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Shape {
    /// Unit cube centered on the entity
    #[default]
    Box,
}

/// Render component; the host draws `shape` at the entity's Transform
#[derive(Component, Serialize, Deserialize, Default, Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct MeshRenderer {
    pub shape: Shape,
}

/// Basic (unlit) material
#[derive(Component, Serialize, Deserialize, Default, Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Color4,
}

impl MeshRenderer {
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    pub fn cube() -> Self {
        Self::new(Shape::Box)
    }
}

impl Material {
    pub fn basic(diffuse: Color4) -> Self {
        Self { diffuse }
    }
}
