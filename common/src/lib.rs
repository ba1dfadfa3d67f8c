//! Components and messages shared by the host and scene plugins
pub mod color;
pub mod input;
pub mod physics;
pub mod render;
pub mod transform;
pub mod utils;

pub use color::Color4;
pub use transform::Transform;
