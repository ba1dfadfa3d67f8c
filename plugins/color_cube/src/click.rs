use colorcube_common::input::{InputAction, PointerDown};
use colorcube_engine_interface::prelude::*;

use crate::{
    config::{Propagation, SceneConfig},
    cube,
    messages::{now_millis, ColorChangeMessage},
    session::{Phase, Session},
};

/// How a color change left this participant
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    /// Re-asserted through the host's replication
    Replicated,
    /// Broadcast as a [ColorChangeMessage]
    Broadcast,
    /// Not propagated at all
    LocalOnly,
}

/// Pick the channel for a change made in `phase` while the host reports `synchronized`
pub fn select_channel(propagation: Propagation, phase: Phase, synchronized: bool) -> Channel {
    match (propagation, phase) {
        (Propagation::Broadcast, _) => Channel::Broadcast,
        (Propagation::Hybrid, Phase::Synced(_)) if synchronized => Channel::Replicated,
        (Propagation::Replicated, Phase::Synced(_)) if synchronized => Channel::Replicated,
        (Propagation::Hybrid, _) => Channel::Broadcast,
        (Propagation::Replicated, _) => Channel::LocalOnly,
    }
}

/// Handle a pointer press. Returns the channel the change went out on, or `None` if the press
/// was not a primary click on the cube.
pub fn handle_pointer_down(
    session: &mut Session,
    config: &SceneConfig,
    io: &mut EngineIo,
    event: &PointerDown,
) -> Option<Channel> {
    let cube = session.cube()?;
    if event.entity != cube || event.button != InputAction::Primary {
        return None;
    }

    session.color_index = config.palette.next(session.color_index);
    cube::apply_color(io, config, cube, session.color_index);

    let channel = select_channel(config.propagation, session.phase, io.is_synchronized());
    match channel {
        Channel::Replicated => cube::replicate(io, config, cube),
        Channel::Broadcast => io.send(&ColorChangeMessage {
            color_index: session.color_index as u32,
            timestamp: now_millis(),
        }),
        Channel::LocalOnly => (),
    }

    log::info!(
        "Color changed via {:?}: {} (index {})",
        channel,
        config.palette.color(session.color_index),
        session.color_index
    );

    Some(channel)
}
