pub mod ecs;
pub mod network;
pub mod plugin;
pub mod replication;
pub mod timing;

use std::collections::HashMap;

use anyhow::{Context, Result};
pub use colorcube_engine_interface as interface;
use ecs::Ecs;
use interface::{
    prelude::*,
    serial::{deserialize, serialize, Inbox, ReceiveBuf, SendBuf},
};
use plugin::Plugin;
use replication::{ReplicatedComponent, Replication};

/// Plugin state, plugin code, ECS state, messaging machinery, and more
pub struct Engine {
    plugins: Vec<PluginState>,
    ecs: Ecs,
    /// Message distribution indices, maps channel id -> plugin indices
    indices: HashMap<ChannelId, Vec<usize>>,
    /// Inboxes of the host application
    external_inbox: Inbox,
    /// Remote-locality messages waiting to go out over the network
    network_outbox: Vec<MessageData>,
    /// Replication oracle, as reported to plugins
    synchronized: bool,
    replication: Replication,
}

/// Plugin management structure
struct PluginState {
    /// Plugin code and interface
    code: Plugin,
    /// Systems on this plugin
    systems: Vec<SystemDescriptor>,
    /// Message inbox
    inbox: Inbox,
    /// Message outbox
    outbox: Vec<MessageData>,
}

impl PluginState {
    pub fn new(code: Plugin) -> Self {
        PluginState {
            code,
            outbox: vec![],
            systems: vec![],
            inbox: HashMap::default(),
        }
    }
}

impl Engine {
    /// Host the given plugins
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self {
            plugins: plugins.into_iter().map(PluginState::new).collect(),
            ecs: Ecs::new(),
            indices: HashMap::new(),
            external_inbox: HashMap::new(),
            network_outbox: vec![],
            synchronized: false,
            replication: Replication::new(),
        }
    }

    /// Initialize plugin code. Must be called exactly once, before any dispatch.
    /// This is seperate from the constructor so that you may decide when plugin code actually
    /// begins executing.
    pub fn init_plugins(&mut self) -> Result<()> {
        for (plugin_idx, plugin) in self.plugins.iter_mut().enumerate() {
            let recv = ReceiveBuf {
                system: None,
                inbox: std::mem::take(&mut plugin.inbox),
                ecs: Default::default(),
                synchronized: self.synchronized,
            };
            let ret = plugin.code.dispatch(recv)?;

            apply_commands(&mut self.ecs, &mut self.replication, &ret)
                .with_context(|| format!("Initializing plugin {}", plugin.code.name()))?;

            // Setup message indices
            for sys in &ret.systems {
                for &channel in &sys.subscriptions {
                    let subscribers = self.indices.entry(channel).or_default();
                    if !subscribers.contains(&plugin_idx) {
                        subscribers.push(plugin_idx);
                    }
                }
            }

            plugin.systems = ret.systems;
            plugin.outbox = ret.outbox;
        }

        self.distribute_messages();

        Ok(())
    }

    /// Dispatch plugin code on the given stage
    pub fn dispatch(&mut self, stage: Stage) -> Result<()> {
        for plugin in &mut self.plugins {
            for (system_idx, system) in plugin.systems.iter().enumerate() {
                // Filter to the requested stage
                if system.stage != stage {
                    continue;
                }

                let recv = ReceiveBuf {
                    system: Some(system_idx),
                    inbox: std::mem::take(&mut plugin.inbox),
                    ecs: self.ecs.query_data(&system.query),
                    synchronized: self.synchronized,
                };

                let ret = plugin.code.dispatch(recv)?;

                // Write back to ECS
                apply_commands(&mut self.ecs, &mut self.replication, &ret).with_context(|| {
                    format!("Applying commands from plugin {}", plugin.code.name())
                })?;

                plugin.outbox.extend(ret.outbox);
            }
        }

        self.distribute_messages();

        Ok(())
    }

    /// Route plugin outboxes to local subscribers, or to the network outbox
    fn distribute_messages(&mut self) {
        for i in 0..self.plugins.len() {
            for msg in std::mem::take(&mut self.plugins[i].outbox) {
                match msg.channel.locality {
                    Locality::Remote => self.network_outbox.push(msg),
                    Locality::Local => self.deliver_local(msg, Some(i)),
                }
            }
        }
    }

    fn deliver_local(&mut self, msg: MessageData, origin: Option<usize>) {
        let mut delivered = false;

        if let Some(destinations) = self.indices.get(&msg.channel) {
            for &j in destinations {
                self.plugins[j]
                    .inbox
                    .entry(msg.channel)
                    .or_default()
                    .push(msg.clone());
                delivered = true;
            }
        }

        if let Some(inbox) = self.external_inbox.get_mut(&msg.channel) {
            inbox.push(msg.clone());
            delivered = true;
        }

        if !delivered {
            log::debug!(
                "Message on channel {:?} from {:?} has no destination",
                msg.channel,
                origin
            );
        }
    }

    /// Access ECS data
    pub fn ecs(&mut self) -> &mut Ecs {
        &mut self.ecs
    }

    /// Subscribe the host application to the given channel
    pub fn subscribe<M: Message>(&mut self) {
        self.external_inbox.entry(M::CHANNEL).or_default();
    }

    /// Drain messages the host application subscribed to
    pub fn inbox<M: Message>(&mut self) -> impl Iterator<Item = M> + '_ {
        self.external_inbox
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

    /// Send a message from the host application to subscribed plugins
    pub fn send<M: Message>(&mut self, data: &M) -> Result<()> {
        let msg = MessageData {
            channel: M::CHANNEL,
            data: serialize(data).context("Serializing host message")?,
        };
        self.deliver_local(msg, None);
        Ok(())
    }

    /// Deliver a message received from the network to subscribed plugins
    pub fn broadcast(&mut self, msg: MessageData) {
        self.deliver_local(msg, None);
    }

    /// Drain messages bound for the network
    pub fn network_outbox(&mut self) -> Vec<MessageData> {
        std::mem::take(&mut self.network_outbox)
    }

    /// Set the replication oracle reported to plugins from the next dispatch on
    pub fn set_synchronized(&mut self, synchronized: bool) {
        self.synchronized = synchronized;
    }

    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    /// Replicated components which changed locally since the last export
    pub fn export_replicated(&mut self) -> Vec<ReplicatedComponent> {
        self.replication.export(&self.ecs)
    }

    /// Apply replicated components received from the network
    pub fn import_replicated(&mut self, updates: Vec<ReplicatedComponent>) -> Result<()> {
        self.replication.import(&mut self.ecs, updates)
    }

    /// Whether a plugin registered the given sync group on this host
    pub fn is_replicated(&self, group: SyncGroupId) -> bool {
        self.replication.is_registered(group)
    }

    /// State of the first plugin holding a `U`
    pub fn plugin_state<U: 'static>(&self) -> Option<&U> {
        self.plugins.iter().find_map(|p| p.code.state::<U>())
    }
}

fn apply_commands(ecs: &mut Ecs, replication: &mut Replication, send: &SendBuf) -> Result<()> {
    for command in &send.commands {
        match command {
            EngineCommand::Create(id) => ecs.import_entity(*id),
            EngineCommand::AddComponent(entity, component, data) => {
                ecs.add_component_raw(*entity, *component, data)?
            }
            EngineCommand::Synchronize(entity, components, group) => {
                replication.register(ecs, *entity, components, *group)?
            }
        }
    }

    Ok(())
}
