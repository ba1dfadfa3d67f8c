use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Client connection identifier; unique to the connection and NOT the client.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub u32);

/// Identifies one replicated entity across every participant of a session.
/// Each participant has its own local [EntityId] for it; the group ties them together.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGroupId(pub u32);

/// Component marking an entity as replicated under the given group
///
/// Added by the host when the plugin asks for replication; plugins should not add it.
#[derive(Component, Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synchronized(pub SyncGroupId);

/// Message which lists currently connected clients. Sent by the host whenever the roster changes.
#[derive(Message, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[locality("Local")]
pub struct Connections {
    pub clients: Vec<ClientId>,
}
