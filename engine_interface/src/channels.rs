use crate::{const_hash, Locality};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Channel identity, a hash of the namespaced message name plus where it is delivered
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelId {
    pub id: u128,
    pub locality: Locality,
}

/// A single message sent or received
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    /// Channel ID
    pub channel: ChannelId,
    /// Message content
    pub data: Vec<u8>,
}

/// Trait describing a message which can be sent over a channel
pub trait Message: Serialize + DeserializeOwned {
    /// Channel this message is sent and received on
    const CHANNEL: ChannelId;
}

impl ChannelId {
    /// Create a channel id from the given (ideally namespaced) name
    pub const fn new(name: &str, locality: Locality) -> Self {
        Self {
            id: const_hash(name),
            locality,
        }
    }
}
