//! Wire types of the scene
use std::time::{SystemTime, UNIX_EPOCH};

use colorcube_engine_interface::prelude::*;
use serde::{Deserialize, Serialize};

/// Broadcast when the cube's color changes while replication is unavailable
#[derive(Message, Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[locality("Remote")]
pub struct ColorChangeMessage {
    pub color_index: u32,
    /// Unix milliseconds at the sender. Logged only; ordering is not resolved with it
    pub timestamp: u64,
}

/// Broadcast once on startup to check that the bus works at all
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[locality("Remote")]
pub struct TestMessage {
    pub message: String,
    pub timestamp: u64,
}

/// Palette index currently shown by the cube; replicated next to the material
#[derive(Component, Serialize, Deserialize, Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct CubeColor {
    pub index: u32,
}

/// Milliseconds since the Unix epoch, or zero if the clock is before it
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
