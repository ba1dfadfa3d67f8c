use std::fmt::{self, Display};
use std::str::FromStr;

use colorcube_common::color::ParseColorError;
use colorcube_engine_interface::prelude::SyncGroupId;
use glam::Vec3;

use crate::palette::Palette;

/// How color changes reach other participants
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Replicate while the host reports the session synchronized, broadcast otherwise
    #[default]
    Hybrid,
    /// Only ever replicate; changes made while unsynchronized stay local
    Replicated,
    /// Only ever broadcast; the cube is never replicated
    Broadcast,
}

/// Scene configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub palette: Palette,
    pub cube_position: Vec3,
    pub hover_text: String,
    /// Frames to wait for synchronization before creating a local-only cube.
    /// The fallback happens on the first frame past this count.
    pub fallback_after_frames: u64,
    /// Log a waiting notice every this many frames
    pub log_every_frames: u64,
    /// Group the cube is replicated under; identical on every participant
    pub sync_group: SyncGroupId,
    pub propagation: Propagation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyPalette,
    InvalidColor(ParseColorError),
    ZeroLogInterval,
    UnknownPropagation(String),
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            cube_position: Vec3::new(8., 1., 8.),
            hover_text: "Click to change color".into(),
            // 5 seconds at 60 fps
            fallback_after_frames: 300,
            log_every_frames: 60,
            sync_group: SyncGroupId(1),
            propagation: Propagation::Hybrid,
        }
    }
}

impl SceneConfig {
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn with_fallback_after(mut self, frames: u64) -> Self {
        self.fallback_after_frames = frames;
        self
    }

    /// Check the settings a scene cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_every_frames == 0 {
            return Err(ConfigError::ZeroLogInterval);
        }
        Ok(())
    }
}

impl FromStr for Propagation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hybrid" => Ok(Self::Hybrid),
            "replicated" => Ok(Self::Replicated),
            "broadcast" => Ok(Self::Broadcast),
            _ => Err(ConfigError::UnknownPropagation(s.to_string())),
        }
    }
}

impl From<ParseColorError> for ConfigError {
    fn from(e: ParseColorError) -> Self {
        Self::InvalidColor(e)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptyPalette => write!(f, "Palette must contain at least one color"),
            Self::InvalidColor(e) => write!(f, "{}", e),
            Self::ZeroLogInterval => write!(f, "Waiting log interval must be at least one frame"),
            Self::UnknownPropagation(s) => write!(
                f,
                "Unknown propagation {:?}, expected hybrid, replicated or broadcast",
                s
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
