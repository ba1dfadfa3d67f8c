use crate::prelude::*;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// Component data as seen by a single system: component -> entity -> bincode bytes
pub type EcsData = HashMap<ComponentId, HashMap<EntityId, Vec<u8>>>;

/// Messages waiting to be read, grouped by channel
pub type Inbox = HashMap<ChannelId, Vec<MessageData>>;

/// Data received by a plugin on each dispatch
#[derive(Clone, Debug, Default)]
pub struct ReceiveBuf {
    /// Which system to execute, `None` to initialize the plugin
    pub system: Option<usize>,
    /// Messages for the plugin
    pub inbox: Inbox,
    /// ECS data matching the system's query
    pub ecs: EcsData,
    /// Replication oracle reported by the host for this frame
    pub synchronized: bool,
}

/// Data sent by a plugin after each dispatch
#[derive(Clone, Debug, Default)]
pub struct SendBuf {
    /// Commands to be applied to the host ECS
    pub commands: Vec<EngineCommand>,
    /// Messages to be sent
    pub outbox: Vec<MessageData>,
    /// Systems registered by the plugin. Only populated on initialization
    pub systems: Vec<SystemDescriptor>,
}

/// Serialize the given object with the crate's encoding
pub fn serialize<T: Serialize>(val: &T) -> bincode::Result<Vec<u8>> {
    bincode::serialize(val)
}

/// Deserialize an object from the reader
pub fn deserialize<R: Read, T: DeserializeOwned>(r: R) -> bincode::Result<T> {
    bincode::deserialize_from(r)
}
