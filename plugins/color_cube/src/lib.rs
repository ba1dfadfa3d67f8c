//! # Color cube
//!
//! A clickable cube that cycles through a palette, with its color shared between everyone in
//! the session. Sharing goes through the host's replication while the host reports the session
//! synchronized, and through a broadcast message otherwise; see [config::Propagation].
//!
//! All per-session state lives in [Session]. Every handler takes it, the configuration and the
//! engine IO explicitly, so each can be driven without a running host.
use colorcube_common::{
    input::{InputAction, OnPointerDown, PointerDown},
    utils::client_tracker::{Action, ClientTracker},
};
use colorcube_engine_interface::prelude::*;

pub mod click;
pub mod config;
pub mod cube;
pub mod messages;
pub mod palette;
pub mod poller;
pub mod receiver;
pub mod session;

pub use config::{Propagation, SceneConfig};
pub use messages::{ColorChangeMessage, CubeColor, TestMessage};
pub use palette::Palette;
pub use session::{Phase, Session};

/// Scene plugin state
pub struct ColorCubeScene {
    config: SceneConfig,
    session: Session,
    roster: ClientTracker,
    /// Test messages received from other players
    greetings: usize,
}

impl UserState for ColorCubeScene {
    fn new(io: &mut EngineIo, sched: &mut EngineSchedule<Self>) -> Self {
        Self::init(SceneConfig::default(), io, sched)
    }
}

impl ColorCubeScene {
    /// Plugin constructor using the given configuration
    pub fn constructor(config: SceneConfig) -> Constructor<Self> {
        Box::new(move |io: &mut EngineIo, sched: &mut EngineSchedule<Self>| {
            Self::init(config, io, sched)
        })
    }

    fn init(config: SceneConfig, io: &mut EngineIo, sched: &mut EngineSchedule<Self>) -> Self {
        log::info!("Scene starting...");
        log::info!("Initial synchronization state: {}", io.is_synchronized());

        sched.add_system(
            Self::update,
            SystemDescriptor::new(Stage::Update)
                .subscribe::<FrameTime>()
                .subscribe::<PointerDown>()
                .subscribe::<ColorChangeMessage>()
                .subscribe::<TestMessage>()
                .subscribe::<Connections>()
                .query(Query::new("cube").intersect::<CubeColor>(Access::Read)),
        );

        // Check that broadcasts get anywhere at all
        io.send(&TestMessage {
            message: "Hello from player".into(),
            timestamp: messages::now_millis(),
        });

        Self {
            config,
            session: Session::new(),
            roster: ClientTracker::new(),
            greetings: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Players currently in the session, as last reported by the host
    pub fn players(&self) -> Vec<ClientId> {
        let mut players: Vec<ClientId> = self.roster.clients().copied().collect();
        players.sort();
        players
    }

    /// Number of test messages received so far
    pub fn greetings(&self) -> usize {
        self.greetings
    }

    fn update(&mut self, io: &mut EngineIo, query: &mut QueryResult) {
        for conns in io.inbox::<Connections>().collect::<Vec<_>>() {
            self.roster.update(&conns, |client, action| match action {
                Action::Connected => log::info!("Player joined: {:?}", client),
                Action::Disconnected => log::info!("Player left: {:?}", client),
            });
        }

        for msg in io.inbox::<TestMessage>().collect::<Vec<_>>() {
            log::info!("Received test message: {:?}", msg);
            self.greetings += 1;
        }

        // Replicated state, as of the end of the last frame
        if let Phase::Synced(cube) = self.session.phase() {
            if self.config.propagation != Propagation::Broadcast {
                if let Some(replicated) = query.read::<CubeColor>(cube) {
                    let index = replicated.index;
                    receiver::reconcile_replicated(&mut self.session, &self.config, io, index);
                }
            }
        }

        for msg in io.inbox::<ColorChangeMessage>().collect::<Vec<_>>() {
            receiver::handle_color_change(&mut self.session, &self.config, io, &msg);
        }

        // One poll per frame
        for frame in io.inbox::<FrameTime>().collect::<Vec<_>>() {
            let outcome = poller::tick(&mut self.session, &self.config, io, frame.delta);
            if let poller::PollOutcome::Created(_) = outcome {
                if let Some(cube) = self.session.cube() {
                    io.send(&OnPointerDown::new(
                        cube,
                        InputAction::Primary,
                        self.config.hover_text.clone(),
                    ));
                }
            }
        }

        for event in io.inbox::<PointerDown>().collect::<Vec<_>>() {
            click::handle_pointer_down(&mut self.session, &self.config, io, &event);
        }
    }
}
