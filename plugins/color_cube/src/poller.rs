//! Per-frame decision of when, and how, the cube comes into existence.
//!
//! Driven by [tick] once per frame. While the host reports the session synchronized the cube
//! is created on the spot and handed to replication. Otherwise frames are counted, and once
//! the count passes [SceneConfig::fallback_after_frames] a local-only cube is created instead.
//! The fallback is final: if synchronization shows up afterwards, nothing is re-created and
//! nothing is replicated.
use colorcube_engine_interface::prelude::*;

use crate::{
    config::{Propagation, SceneConfig},
    cube,
    session::{Phase, Session},
};

/// What a single tick did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// Cube created through the given path
    Created(CreationPath),
    /// Still waiting for synchronization
    Waiting,
    /// Cube already exists
    Idle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CreationPath {
    Authoritative,
    Fallback,
}

/// Advance the session by one frame of `frame_elapsed` seconds
pub fn tick(
    session: &mut Session,
    config: &SceneConfig,
    io: &mut EngineIo,
    frame_elapsed: f32,
) -> PollOutcome {
    let Phase::Waiting { frames } = session.phase else {
        return PollOutcome::Idle;
    };
    let frames = frames + 1;
    session.waited += frame_elapsed;

    if io.is_synchronized() {
        log::info!("State synchronized - creating cube");
        let entity = cube::spawn(io, config, session.color_index);
        if config.propagation != Propagation::Broadcast {
            cube::replicate(io, config, entity);
        }
        session.phase = Phase::Synced(entity);
        log::info!("Multiplayer cube created and synced");
        return PollOutcome::Created(CreationPath::Authoritative);
    }

    if frames % config.log_every_frames.max(1) == 0 {
        log::warn!(
            "State not synchronized - waiting... (frame: {}, {:.1}s)",
            frames,
            session.waited
        );
    }

    if frames > config.fallback_after_frames {
        log::warn!(
            "Creating local cube after {} frames without synchronization; it will not be replicated",
            frames
        );
        let entity = cube::spawn(io, config, session.color_index);
        session.phase = Phase::Fallback(entity);
        return PollOutcome::Created(CreationPath::Fallback);
    }

    session.phase = Phase::Waiting { frames };
    PollOutcome::Waiting
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1. / 60.;

    fn synchronize_commands(io: &EngineIo) -> usize {
        io.commands()
            .iter()
            .filter(|c| matches!(c, EngineCommand::Synchronize(..)))
            .count()
    }

    fn create_commands(io: &EngineIo) -> usize {
        io.commands()
            .iter()
            .filter(|c| matches!(c, EngineCommand::Create(_)))
            .count()
    }

    #[test]
    fn synchronized_on_first_frame_creates_authoritatively() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        let mut io = EngineIo::new(true);

        let outcome = tick(&mut session, &config, &mut io, DT);
        assert_eq!(outcome, PollOutcome::Created(CreationPath::Authoritative));
        assert!(matches!(session.phase(), Phase::Synced(_)));
        assert_eq!(create_commands(&io), 1);
        assert_eq!(synchronize_commands(&io), 1);
    }

    #[test]
    fn created_at_most_once() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        let mut io = EngineIo::new(true);

        for _ in 0..1000 {
            tick(&mut session, &config, &mut io, DT);
        }
        assert_eq!(create_commands(&io), 1);
        assert_eq!(tick(&mut session, &config, &mut io, DT), PollOutcome::Idle);
    }

    #[test]
    fn fallback_after_threshold_exactly_once() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        let mut io = EngineIo::new(false);

        for frame in 1..=300 {
            assert_eq!(
                tick(&mut session, &config, &mut io, DT),
                PollOutcome::Waiting,
                "frame {}",
                frame
            );
        }
        assert_eq!(session.phase(), Phase::Waiting { frames: 300 });

        assert_eq!(
            tick(&mut session, &config, &mut io, DT),
            PollOutcome::Created(CreationPath::Fallback)
        );

        // Synchronization showing up late changes nothing
        io.set_synchronized(true);
        for _ in 0..100 {
            assert_eq!(tick(&mut session, &config, &mut io, DT), PollOutcome::Idle);
        }
        assert!(matches!(session.phase(), Phase::Fallback(_)));
        assert_eq!(create_commands(&io), 1);
        assert_eq!(synchronize_commands(&io), 0);
    }

    #[test]
    fn sync_during_wait_wins_over_fallback() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        let mut io = EngineIo::new(false);

        for _ in 0..120 {
            tick(&mut session, &config, &mut io, DT);
        }
        io.set_synchronized(true);
        assert_eq!(
            tick(&mut session, &config, &mut io, DT),
            PollOutcome::Created(CreationPath::Authoritative)
        );
    }

    #[test]
    fn broadcast_only_never_replicates() {
        let config = SceneConfig::default().with_propagation(Propagation::Broadcast);
        let mut session = Session::new();
        let mut io = EngineIo::new(true);

        tick(&mut session, &config, &mut io, DT);
        assert!(matches!(session.phase(), Phase::Synced(_)));
        assert_eq!(synchronize_commands(&io), 0);
    }

    #[test]
    fn creation_uses_current_index() {
        let config = SceneConfig::default();
        let mut session = Session::new();
        session.color_index = 2;
        let mut io = EngineIo::new(true);
        tick(&mut session, &config, &mut io, DT);

        let material = colorcube_engine_interface::serial::serialize(
            &colorcube_common::render::Material::basic(config.palette.color(2)),
        )
        .unwrap();
        assert!(io.commands().iter().any(|c| matches!(
            c,
            EngineCommand::AddComponent(_, id, data)
                if *id == colorcube_common::render::Material::ID && *data == material
        )));
    }
}
