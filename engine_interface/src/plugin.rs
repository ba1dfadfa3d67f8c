use std::collections::HashMap;

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    prelude::*,
    serial::{deserialize, serialize, Inbox, ReceiveBuf, SendBuf},
};

/// Single command to be sent to engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCommand {
    Create(EntityId),
    AddComponent(EntityId, ComponentId, Vec<u8>),
    /// Ask the host to replicate the given components of the entity under the sync group.
    /// Idempotent; re-sending re-asserts the current values.
    Synchronize(EntityId, Vec<ComponentId>, SyncGroupId),
}

/// System callable by the engine
pub type Callback<UserState> = fn(&mut UserState, &mut EngineIo, &mut QueryResult);

/// Constructor for plugin state
pub type Constructor<U> = Box<dyn FnOnce(&mut EngineIo, &mut EngineSchedule<U>) -> U>;

/// Application state, defines a constructor with common engine interface in it
pub trait UserState: Sized + 'static {
    fn new(io: &mut EngineIo, sched: &mut EngineSchedule<Self>) -> Self;
}

/// Anything the host can dispatch; implemented by [Context] for every plugin state type
pub trait PluginDispatch {
    fn dispatch(&mut self, recv: ReceiveBuf) -> SendBuf;
}

/// Full plugin context, contains user state and engine IO buffers
pub struct Context<U> {
    /// User-defined state
    user: Option<U>,
    /// Constructor, consumed on first dispatch
    init: Option<Constructor<U>>,
    /// Callbacks for systems and their associated subscription parameters
    sched: EngineSchedule<U>,
    /// Entity id source
    rng: SmallRng,
}

/// Contains received messages and the replication oracle.
/// Also contains the commands to be sent to the engine.
pub struct EngineIo {
    rng: SmallRng,
    synchronized: bool,
    inbox: Inbox,
    outbox: Vec<MessageData>,
    commands: Vec<EngineCommand>,
}

/// Scheduling of systems
/// Not a part of EngineIo, in order to prevent developers from attempting to add systems from
/// other systems (!)
pub struct EngineSchedule<U> {
    systems: Vec<SystemDescriptor>,
    callbacks: Vec<Callback<U>>,
}

/// Builder for a new entity; see [EngineIo::create_entity]
pub struct EntityBuilder<'io> {
    io: &'io mut EngineIo,
    entity: EntityId,
}

impl<U> EngineSchedule<U> {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    pub fn add_system(&mut self, cb: Callback<U>, desc: SystemDescriptor) {
        self.systems.push(desc);
        self.callbacks.push(cb);
    }
}

impl<U> Default for EngineSchedule<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: UserState> Context<U> {
    /// Context for a plugin constructed with [UserState::new]
    pub fn new(seed: u64) -> Self {
        Self::with_constructor(seed, Box::new(U::new))
    }
}

impl<U: 'static> Context<U> {
    /// Context for a plugin built by an arbitrary constructor, e.g. one capturing configuration
    pub fn with_constructor(seed: u64, init: Constructor<U>) -> Self {
        Self {
            user: None,
            init: Some(init),
            sched: EngineSchedule::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Plugin state, if initialized
    pub fn user(&self) -> Option<&U> {
        self.user.as_ref()
    }

    fn dispatch_inner(&mut self, recv: ReceiveBuf) -> SendBuf {
        let rng = SmallRng::seed_from_u64(self.rng.gen());
        let mut io = EngineIo::from_parts(rng, recv.synchronized, recv.inbox);

        // Initialize user code
        let Some(idx) = recv.system else {
            match self.init.take() {
                Some(init) => self.user = Some(init(&mut io, &mut self.sched)),
                None => log::warn!("Plugin initialized twice; ignoring"),
            }
            let (commands, outbox) = io.finish();
            return SendBuf {
                commands,
                outbox,
                systems: self.sched.systems.clone(),
            };
        };

        match (self.user.as_mut(), self.sched.systems.get(idx)) {
            (Some(user), Some(desc)) => {
                let mut query = QueryResult::new(recv.ecs, desc.query.clone());
                (self.sched.callbacks[idx])(user, &mut io, &mut query);
            }
            (None, _) => log::error!("System {} dispatched before initialization", idx),
            (_, None) => log::error!("Dispatched non-existent system {}", idx),
        }

        let (commands, outbox) = io.finish();
        SendBuf {
            commands,
            outbox,
            systems: vec![],
        }
    }
}

impl<U: 'static> PluginDispatch for Context<U> {
    fn dispatch(&mut self, recv: ReceiveBuf) -> SendBuf {
        self.dispatch_inner(recv)
    }
}

impl EngineIo {
    /// Empty IO, as seen by a plugin with nothing in its inbox
    pub fn new(synchronized: bool) -> Self {
        Self::from_parts(SmallRng::seed_from_u64(0), synchronized, HashMap::new())
    }

    fn from_parts(rng: SmallRng, synchronized: bool, inbox: Inbox) -> Self {
        Self {
            rng,
            synchronized,
            inbox,
            outbox: vec![],
            commands: vec![],
        }
    }

    /// Queue a message for delivery to the host (for local channels), or the network (for remote channels)
    pub fn send<M: Message>(&mut self, msg: &M) {
        match serialize(msg) {
            Ok(data) => self.outbox.push(MessageData {
                channel: M::CHANNEL,
                data,
            }),
            Err(e) => log::error!("Failed to serialize message on {:?}: {}", M::CHANNEL, e),
        }
    }

    /// Drain received messages of type `M`. Malformed messages are logged and skipped.
    pub fn inbox<M: Message>(&mut self) -> impl Iterator<Item = M> + '_ {
        self.inbox
            .get_mut(&M::CHANNEL)
            .into_iter()
            .flat_map(|msgs| msgs.drain(..))
            .filter_map(|msg| match deserialize(msg.data.as_slice()) {
                Ok(m) => Some(m),
                Err(e) => {
                    log::error!("Failed to decode message on {:?}: {}", msg.channel, e);
                    None
                }
            })
    }

    /// Push a message into this IO's inbox, as the host would
    pub fn deliver<M: Message>(&mut self, msg: &M) {
        match serialize(msg) {
            Ok(data) => self.inbox.entry(M::CHANNEL).or_default().push(MessageData {
                channel: M::CHANNEL,
                data,
            }),
            Err(e) => log::error!("Failed to serialize message on {:?}: {}", M::CHANNEL, e),
        }
    }

    /// Whether the host reports this session's shared state as synchronized with the network.
    /// Best-effort; the host makes no stronger promise than its own replication does.
    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    /// Override the replication oracle, e.g. when driving handlers without a host
    pub fn set_synchronized(&mut self, synchronized: bool) {
        self.synchronized = synchronized;
    }

    /// Begin building a new entity
    pub fn create_entity(&mut self) -> EntityBuilder<'_> {
        let entity = EntityId(self.rng.gen());
        self.commands.push(EngineCommand::Create(entity));
        EntityBuilder { io: self, entity }
    }

    pub fn add_component<C: Component>(&mut self, entity: EntityId, data: &C) {
        match serialize(data) {
            Ok(data) => self
                .commands
                .push(EngineCommand::AddComponent(entity, C::ID, data)),
            Err(e) => log::error!("Failed to serialize component {:?}: {}", C::ID, e),
        }
    }

    /// Ask the host to replicate the given components of `entity` under `group`
    pub fn synchronize(&mut self, entity: EntityId, components: &[ComponentId], group: SyncGroupId) {
        self.commands
            .push(EngineCommand::Synchronize(entity, components.to_vec(), group));
    }

    /// Commands queued so far
    pub fn commands(&self) -> &[EngineCommand] {
        &self.commands
    }

    /// Messages queued so far
    pub fn outbox(&self) -> &[MessageData] {
        &self.outbox
    }

    /// Consume this IO, returning the queued commands and messages
    pub fn finish(self) -> (Vec<EngineCommand>, Vec<MessageData>) {
        (self.commands, self.outbox)
    }
}

impl EntityBuilder<'_> {
    /// Add a component to the entity being built
    pub fn add_component<C: Component>(self, data: C) -> Self {
        self.io.add_component(self.entity, &data);
        self
    }

    /// Finish building, returning the new entity's id
    pub fn build(self) -> EntityId {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Message, Serialize, Deserialize, Debug, PartialEq)]
    #[locality("Remote")]
    struct Ping(u32);

    struct Counter {
        pings: u32,
    }

    impl UserState for Counter {
        fn new(io: &mut EngineIo, sched: &mut EngineSchedule<Self>) -> Self {
            io.send(&Ping(0));
            sched.add_system(
                Self::update,
                SystemDescriptor::new(Stage::Update).subscribe::<Ping>(),
            );
            Self { pings: 0 }
        }
    }

    impl Counter {
        fn update(&mut self, io: &mut EngineIo, _query: &mut QueryResult) {
            self.pings += io.inbox::<Ping>().count() as u32;
            io.create_entity().build();
        }
    }

    #[test]
    fn init_then_dispatch() {
        let mut ctx = Context::<Counter>::new(1);
        let init = ctx.dispatch(ReceiveBuf::default());
        assert_eq!(init.systems.len(), 1);
        assert_eq!(init.outbox.len(), 1);
        assert_eq!(init.outbox[0].channel, Ping::CHANNEL);

        let mut io = EngineIo::new(false);
        io.deliver(&Ping(4));
        io.deliver(&Ping(5));
        let recv = ReceiveBuf {
            system: Some(0),
            inbox: std::mem::take(&mut io.inbox),
            ..Default::default()
        };
        let sent = ctx.dispatch(recv);
        assert_eq!(ctx.user().map(|u| u.pings), Some(2));
        assert!(matches!(sent.commands.as_slice(), [EngineCommand::Create(_)]));
        assert!(sent.systems.is_empty());
    }

    #[test]
    fn builder_queues_components() {
        let mut io = EngineIo::new(true);
        let entity = io.create_entity().add_component(Synchronized(SyncGroupId(3))).build();
        assert!(io.is_synchronized());
        assert_eq!(io.commands().len(), 2);
        assert_eq!(io.commands()[0], EngineCommand::Create(entity));
    }
}
