use colorcube_engine::{
    interface::prelude::*,
    network::{HubConfig, LoopbackHub},
    plugin::Plugin,
    Engine,
};
use serde::{Deserialize, Serialize};

#[derive(Message, Serialize, Deserialize, Debug, Clone, Copy)]
#[locality("Remote")]
struct Bump(u32);

#[derive(Component, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
struct Level(u32);

const GROUP: SyncGroupId = SyncGroupId(9);

/// Keeps one replicated entity, and counts bumps received from other peers
struct Counter {
    entity: EntityId,
    received: Vec<u32>,
}

impl UserState for Counter {
    fn new(io: &mut EngineIo, sched: &mut EngineSchedule<Self>) -> Self {
        let entity = io.create_entity().add_component(Level(0)).build();
        io.synchronize(entity, &[Level::ID], GROUP);
        sched.add_system(
            Self::update,
            SystemDescriptor::new(Stage::Update).subscribe::<Bump>(),
        );
        Self {
            entity,
            received: vec![],
        }
    }
}

impl Counter {
    fn update(&mut self, io: &mut EngineIo, _query: &mut QueryResult) {
        self.received.extend(io.inbox::<Bump>().map(|b| b.0));
    }
}

fn engine(seed: u64) -> Engine {
    let mut engine = Engine::new(vec![Plugin::native::<Counter>("counter", seed)]);
    engine.init_plugins().unwrap();
    engine
}

/// Engine whose plugin announces `tag` on startup
fn tagged(tag: u32) -> Engine {
    let plugin = Plugin::with_constructor::<Counter>(
        "counter",
        u64::from(tag),
        Box::new(move |io: &mut EngineIo, sched: &mut EngineSchedule<Counter>| {
            io.send(&Bump(tag));
            Counter::new(io, sched)
        }),
    );
    let mut engine = Engine::new(vec![plugin]);
    engine.init_plugins().unwrap();
    engine
}

fn step(hub: &mut LoopbackHub, a: &mut Engine, b: &mut Engine) {
    a.dispatch(Stage::Update).unwrap();
    b.dispatch(Stage::Update).unwrap();
    hub.exchange(&mut [a, b]).unwrap();
}

#[test]
fn broadcasts_reach_others_but_not_the_sender() {
    let mut hub = LoopbackHub::new(HubConfig::default());
    let (mut a, mut b) = (tagged(1), tagged(2));
    step(&mut hub, &mut a, &mut b);
    step(&mut hub, &mut a, &mut b);
    assert_eq!(a.plugin_state::<Counter>().unwrap().received, vec![2]);
    assert_eq!(b.plugin_state::<Counter>().unwrap().received, vec![1]);
}

#[test]
fn dropped_messages_never_arrive() {
    let mut hub = LoopbackHub::new(HubConfig {
        drop_probability: 1.,
        ..Default::default()
    });
    let (mut a, mut b) = (tagged(1), tagged(2));
    step(&mut hub, &mut a, &mut b);
    step(&mut hub, &mut a, &mut b);
    assert!(a.plugin_state::<Counter>().unwrap().received.is_empty());
    assert!(b.plugin_state::<Counter>().unwrap().received.is_empty());
}

#[test]
fn out_of_range_drop_probability_delivers_everything() {
    for drop_probability in [f64::NAN, f64::INFINITY, -0.5] {
        let mut hub = LoopbackHub::new(HubConfig {
            drop_probability,
            ..Default::default()
        });
        let (mut a, mut b) = (tagged(1), tagged(2));
        step(&mut hub, &mut a, &mut b);
        step(&mut hub, &mut a, &mut b);
        assert_eq!(a.plugin_state::<Counter>().unwrap().received, vec![2]);
        assert_eq!(b.plugin_state::<Counter>().unwrap().received, vec![1]);
    }
}

#[test]
fn replication_waits_for_online() {
    let mut hub = LoopbackHub::new(HubConfig::default());
    let (mut a, mut b) = (engine(1), engine(2));
    let ea = a.plugin_state::<Counter>().unwrap().entity;
    let eb = b.plugin_state::<Counter>().unwrap().entity;
    assert!(a.is_replicated(GROUP));

    a.ecs().add_component(ea, &Level(3)).unwrap();
    step(&mut hub, &mut a, &mut b);
    assert!(!b.is_synchronized());
    assert_eq!(b.ecs().get::<Level>(eb).unwrap(), Some(Level(0)));

    hub.set_online(true);
    step(&mut hub, &mut a, &mut b);
    assert!(b.is_synchronized());
    assert_eq!(b.ecs().get::<Level>(eb).unwrap(), Some(Level(3)));
}

#[test]
fn concurrent_replicated_writes_converge() {
    let mut hub = LoopbackHub::new(HubConfig::default());
    hub.set_online(true);
    let (mut a, mut b) = (engine(1), engine(2));
    step(&mut hub, &mut a, &mut b);

    let ea = a.plugin_state::<Counter>().unwrap().entity;
    let eb = b.plugin_state::<Counter>().unwrap().entity;
    a.ecs().add_component(ea, &Level(1)).unwrap();
    b.ecs().add_component(eb, &Level(2)).unwrap();
    step(&mut hub, &mut a, &mut b);

    let la = a.ecs().get::<Level>(ea).unwrap().unwrap();
    let lb = b.ecs().get::<Level>(eb).unwrap().unwrap();
    assert_eq!(la, lb);
    assert!(la == Level(1) || la == Level(2));
}
