use colorcube_common::{
    physics::MeshCollider,
    render::{Material, MeshRenderer},
    Transform,
};
use colorcube_engine_interface::prelude::*;

use crate::{config::SceneConfig, messages::CubeColor};

/// Components replicated for the cube
pub const REPLICATED: [ComponentId; 2] = [Material::ID, CubeColor::ID];

/// Create the cube showing the color at `index`. Nothing is replicated here.
pub fn spawn(io: &mut EngineIo, config: &SceneConfig, index: usize) -> EntityId {
    io.create_entity()
        .add_component(MeshRenderer::cube())
        .add_component(MeshCollider::cube())
        .add_component(Transform::from_position(config.cube_position))
        .add_component(Material::basic(config.palette.color(index)))
        .add_component(CubeColor {
            index: index as u32,
        })
        .build()
}

/// Show the color at `index` on the local cube
pub fn apply_color(io: &mut EngineIo, config: &SceneConfig, cube: EntityId, index: usize) {
    io.add_component(cube, &Material::basic(config.palette.color(index)));
    io.add_component(
        cube,
        &CubeColor {
            index: index as u32,
        },
    );
}

/// Ask the host to reconcile the cube's color network-wide
pub fn replicate(io: &mut EngineIo, config: &SceneConfig, cube: EntityId) {
    io.synchronize(cube, &REPLICATED, config.sync_group);
}
