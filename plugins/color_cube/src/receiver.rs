use colorcube_engine_interface::prelude::*;

use crate::{config::SceneConfig, cube, messages::ColorChangeMessage, session::Session};

/// Apply a color change broadcast by another participant. The last one processed wins,
/// regardless of its timestamp or of local clicks made in the meantime. Before the cube
/// exists only the index is kept; creation picks it up.
pub fn handle_color_change(
    session: &mut Session,
    config: &SceneConfig,
    io: &mut EngineIo,
    msg: &ColorChangeMessage,
) {
    log::info!(
        "Received color change from other player: index {} at {}",
        msg.color_index,
        msg.timestamp
    );

    let index = config.palette.wrap(msg.color_index as usize);
    if index != msg.color_index as usize {
        log::warn!(
            "Color index {} outside palette of {}, using {}",
            msg.color_index,
            config.palette.len(),
            index
        );
    }
    session.color_index = index;

    if let Some(cube) = session.cube() {
        cube::apply_color(io, config, cube, index);
        log::info!(
            "Updated cube color to match other player: {}",
            config.palette.color(index)
        );
    }
}

/// Adopt a replicated color index that differs from the local one
pub fn reconcile_replicated(
    session: &mut Session,
    config: &SceneConfig,
    io: &mut EngineIo,
    replicated: u32,
) {
    let index = config.palette.wrap(replicated as usize);
    if index == session.color_index {
        return;
    }

    log::info!(
        "Adopting replicated color index {} (was {})",
        index,
        session.color_index
    );
    session.color_index = index;
    if let Some(cube) = session.cube() {
        cube::apply_color(io, config, cube, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{poller, session::Phase};
    use colorcube_common::render::Material;
    use colorcube_engine_interface::serial::serialize;

    fn msg(color_index: u32) -> ColorChangeMessage {
        ColorChangeMessage {
            color_index,
            timestamp: 1_700_000_000_000,
        }
    }

    fn material_of(io: &EngineIo, index: usize, config: &SceneConfig) -> bool {
        let expected = serialize(&Material::basic(config.palette.color(index))).unwrap();
        io.commands().iter().any(|c| {
            matches!(c, EngineCommand::AddComponent(_, id, data) if *id == Material::ID && *data == expected)
        })
    }

    #[test]
    fn early_message_colors_the_new_cube() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        let mut io = EngineIo::new(false);

        handle_color_change(&mut session, &config, &mut io, &msg(2));
        assert!(io.commands().is_empty());
        assert_eq!(session.color_index(), 2);

        io.set_synchronized(true);
        poller::tick(&mut session, &config, &mut io, 1. / 60.);
        assert!(material_of(&io, 2, &config));
        assert!(!material_of(&io, 0, &config));
    }

    #[test]
    fn overwrites_existing_cube() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        session.phase = Phase::Fallback(EntityId(5));
        let mut io = EngineIo::new(false);

        handle_color_change(&mut session, &config, &mut io, &msg(6));
        assert_eq!(session.color_index(), 6);
        assert!(material_of(&io, 6, &config));
    }

    #[test]
    fn last_message_wins() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        let mut io = EngineIo::new(false);

        // Timestamps are not consulted
        let newer = ColorChangeMessage {
            color_index: 1,
            timestamp: 2,
        };
        let older = ColorChangeMessage {
            color_index: 2,
            timestamp: 1,
        };
        handle_color_change(&mut session, &config, &mut io, &newer);
        handle_color_change(&mut session, &config, &mut io, &older);
        assert_eq!(session.color_index(), 2);
    }

    #[test]
    fn out_of_range_index_wraps() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        let mut io = EngineIo::new(false);
        handle_color_change(&mut session, &config, &mut io, &msg(13));
        assert_eq!(session.color_index(), 3);
    }

    #[test]
    fn reconcile_adopts_only_differences() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        session.phase = Phase::Synced(EntityId(5));
        let mut io = EngineIo::new(true);

        reconcile_replicated(&mut session, &config, &mut io, 0);
        assert!(io.commands().is_empty());

        reconcile_replicated(&mut session, &config, &mut io, 4);
        assert_eq!(session.color_index(), 4);
        assert!(material_of(&io, 4, &config));
    }
}
