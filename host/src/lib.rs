//! In-process stand-in for the host engine: runs one scene per participant, and joins the
//! participants with a [LoopbackHub].
use anyhow::{Context, Result};
use color_cube::{ColorCubeScene, Phase, SceneConfig};
use colorcube_common::{
    input::{InputAction, OnPointerDown, PointerDown},
    render::Material,
    Color4,
};
use colorcube_engine::{
    interface::prelude::{ClientId, Connections, Stage},
    network::{HubConfig, LoopbackHub},
    plugin::Plugin,
    timing::Timing,
    Engine,
};

/// Frame rate assumed when none is given
pub const DEFAULT_FPS: f32 = 60.;

/// One participant: an engine running the scene, plus the input state a real client would own
pub struct Peer {
    id: ClientId,
    engine: Engine,
    timing: Timing,
    /// Pointer-down registrations received from the scene
    targets: Vec<OnPointerDown>,
}

impl Peer {
    pub fn new(id: ClientId, config: SceneConfig, seed: u64, synchronized: bool) -> Result<Self> {
        let plugin = Plugin::with_constructor(
            "color_cube",
            seed,
            ColorCubeScene::constructor(config),
        );
        let mut engine = Engine::new(vec![plugin]);
        engine.subscribe::<OnPointerDown>();
        engine.set_synchronized(synchronized);
        engine
            .init_plugins()
            .with_context(|| format!("Starting scene for {:?}", id))?;

        Ok(Self {
            id,
            engine,
            timing: Timing::fixed(DEFAULT_FPS),
            targets: vec![],
        })
    }

    /// Use a different frame rate for this peer's clock
    pub fn with_fps(mut self, fps: f32) -> Self {
        self.timing = Timing::fixed(fps);
        self
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Run one frame of the scene
    pub fn frame(&mut self) -> Result<()> {
        let time = self.timing.frame();
        self.engine.send(&time)?;

        self.engine.dispatch(Stage::PreUpdate)?;
        self.engine.dispatch(Stage::Update)?;
        self.engine.dispatch(Stage::PostUpdate)?;

        let registered: Vec<OnPointerDown> = self.engine.inbox::<OnPointerDown>().collect();
        for target in registered {
            log::debug!(
                "{:?} registered pointer-down on {:?} ({:?}): {:?}",
                self.id,
                target.entity,
                target.button,
                target.hover_text
            );
            self.targets.push(target);
        }

        Ok(())
    }

    /// Press a button on an entity. Returns whether any registration matched, in which case the
    /// scene sees the press on its next frame.
    pub fn press(&mut self, event: PointerDown) -> Result<bool> {
        if !self.targets.iter().any(|t| t.matches(&event)) {
            return Ok(false);
        }
        self.engine.send(&event)?;
        Ok(true)
    }

    /// Primary click on the first registered entity
    pub fn click(&mut self) -> Result<bool> {
        let Some(target) = self
            .targets
            .iter()
            .find(|t| t.button == InputAction::Primary)
        else {
            return Ok(false);
        };

        let event = PointerDown {
            entity: target.entity,
            button: InputAction::Primary,
        };
        self.press(event)
    }

    /// Hover text of the first registered entity
    pub fn hover_text(&self) -> Option<&str> {
        self.targets.first().map(|t| t.hover_text.as_str())
    }

    pub fn scene(&self) -> Option<&ColorCubeScene> {
        self.engine.plugin_state::<ColorCubeScene>()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.scene().map(|s| s.session().phase())
    }

    /// Players this peer's scene knows about
    pub fn players(&self) -> Vec<ClientId> {
        self.scene().map(|s| s.players()).unwrap_or_default()
    }

    /// Test messages this peer's scene has received
    pub fn greetings(&self) -> usize {
        self.scene().map_or(0, |s| s.greetings())
    }

    pub fn color_index(&self) -> Option<usize> {
        self.scene().map(|s| s.session().color_index())
    }

    /// Color the host would draw the cube with
    pub fn cube_color(&mut self) -> Result<Option<Color4>> {
        let Some(cube) = self.scene().and_then(|s| s.session().cube()) else {
            return Ok(None);
        };
        Ok(self.engine.ecs().get::<Material>(cube)?.map(|m| m.diffuse))
    }

    pub fn engine(&mut self) -> &mut Engine {
        &mut self.engine
    }
}

/// Several peers in one session
pub struct Simulation {
    hub: LoopbackHub,
    seed: u64,
    fps: f32,
    peers: Vec<Peer>,
    next_id: u32,
}

impl Simulation {
    pub fn new(hub: HubConfig) -> Self {
        Self {
            seed: hub.seed,
            hub: LoopbackHub::new(hub),
            fps: DEFAULT_FPS,
            peers: vec![],
            next_id: 0,
        }
    }

    /// Frame rate of peers added from now on
    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    /// Add a participant running the scene with `config`
    pub fn add_peer(&mut self, config: SceneConfig) -> Result<ClientId> {
        let id = ClientId(self.next_id);
        self.next_id += 1;

        let seed = self.seed.wrapping_add(u64::from(id.0));
        let mut peer = Peer::new(id, config, seed, self.hub.is_online())?.with_fps(self.fps);

        // Late joiners start from the session's replicated state
        peer.engine.import_replicated(self.hub.snapshot())?;

        log::info!("{:?} joined", id);
        self.peers.push(peer);
        self.announce()?;

        Ok(id)
    }

    /// Remove a participant. Its cube, if any, leaves with it.
    pub fn remove_peer(&mut self, id: ClientId) -> Result<()> {
        self.peers.retain(|p| p.id != id);
        log::info!("{:?} left", id);
        self.announce()
    }

    fn announce(&mut self) -> Result<()> {
        let roster = Connections {
            clients: self.peers.iter().map(|p| p.id).collect(),
        };
        for peer in &mut self.peers {
            peer.engine.send(&roster)?;
        }
        Ok(())
    }

    /// Bring replication up or down for everyone
    pub fn set_online(&mut self, online: bool) {
        self.hub.set_online(online);
    }

    /// Run one frame on every peer, then move network traffic
    pub fn step(&mut self) -> Result<()> {
        for peer in &mut self.peers {
            peer.frame()
                .with_context(|| format!("Running frame for {:?}", peer.id))?;
        }

        let mut engines: Vec<&mut Engine> = self.peers.iter_mut().map(|p| &mut p.engine).collect();
        self.hub.exchange(&mut engines)
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn peers_mut(&mut self) -> &mut [Peer] {
        &mut self.peers
    }

    pub fn peer_mut(&mut self, id: ClientId) -> Option<&mut Peer> {
        self.peers.iter_mut().find(|p| p.id == id)
    }
}
