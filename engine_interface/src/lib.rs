use serde::{Deserialize, Serialize};

/// Code shared between plugins and the host for running plugin systems
pub mod plugin;

/// ECS interfacing types
pub mod ecs;

/// Serialization format for plugin to host communication and vice versa
pub mod serial;

/// Message channels
pub mod channels;

/// System scheduling
pub mod system;

/// Replication and connection types
pub mod network;

pub use log;

/// Whether a message stays within this process, or goes out over the network
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locality {
    Local,
    Remote,
}

/// Frame timing information, sent by the host at the start of every frame
#[derive(Message, Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq)]
#[locality("Local")]
pub struct FrameTime {
    /// Seconds elapsed since the last frame
    pub delta: f32,
    /// Seconds elapsed since the host started
    pub time: f32,
}

/// Prefixes the given name with the name of the current crate, e.g.
/// `pkg_namespace!("Material")` becomes `"colorcube_common/Material"`.
#[macro_export]
macro_rules! pkg_namespace {
    ($name:expr) => {
        concat!(env!("CARGO_PKG_NAME"), "/", $name)
    };
}

/// A pretty bad hash function. Made constant so that ids may be declared as constants:
/// ```rust
/// use colorcube_engine_interface::{pkg_namespace, prelude::*};
/// const CUBE: ComponentId = ComponentId::new(pkg_namespace!("Cube"));
/// ```
pub const fn const_hash(s: &str) -> u128 {
    const C: u128 = 31;
    let mut hash: u128 = 0;
    let mut i = 0;
    let bytes = s.as_bytes();
    while i < bytes.len() {
        let b = bytes[i] as u128;
        hash = hash.wrapping_mul(C).wrapping_add(b);
        i += 1;
    }
    hash
}

// Lets the derive macros refer to this crate by name from inside it
extern crate self as colorcube_engine_interface;

/// Convenience imports for the lazy
pub mod prelude {
    pub use super::channels::*;
    pub use super::ecs::*;
    pub use super::network::*;
    pub use super::plugin::*;
    pub use super::system::*;
    pub use super::{FrameTime, Locality};
    pub use crate::pkg_namespace;
    pub use colorcube_derive_macros::{Component, Message};
}

use prelude::*;
