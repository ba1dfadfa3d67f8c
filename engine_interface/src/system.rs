//! Types used for communication with the engine
use crate::prelude::*;

/// A description of a system within this plugin
#[derive(Clone, Debug, Default)]
pub struct SystemDescriptor {
    /// The stage controls when this system is executed relative to other systems
    pub stage: Stage,
    /// Channels this system subscribes to
    pub subscriptions: Vec<ChannelId>,
    /// Component query
    pub query: Query,
}

/// The execution cycle of the host is something like this:
/// * Receive network traffic and frame timing
/// * PreUpdate
/// * Update
/// * PostUpdate
/// * Send network traffic
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    PreUpdate,
    #[default]
    Update,
    PostUpdate,
}

impl SystemDescriptor {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            ..Default::default()
        }
    }

    /// Subscribe this system to messages of type `M`
    pub fn subscribe<M: Message>(mut self) -> Self {
        self.subscriptions.push(M::CHANNEL);
        self
    }

    /// Set the component query for this system
    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }
}
