use std::collections::HashSet;

use colorcube_engine_interface::prelude::{ClientId, Connections};

/// Runs a callback whenever a client connects or disconnects
#[derive(Default, Clone, Debug)]
pub struct ClientTracker(HashSet<ClientId>);

impl ClientTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the client tracker, invoking the connect/disconnect callbacks as appropriate
    pub fn update(&mut self, conns: &Connections, mut callback: impl FnMut(ClientId, Action)) {
        let new_state: HashSet<ClientId> = conns.clients.iter().copied().collect();
        let ClientTracker(current_state) = self;

        let mut left: Vec<ClientId> = current_state.difference(&new_state).copied().collect();
        left.sort();
        for client in left {
            callback(client, Action::Disconnected);
        }

        let mut joined: Vec<ClientId> = new_state.difference(current_state).copied().collect();
        joined.sort();
        for client in joined {
            callback(client, Action::Connected);
        }

        *current_state = new_state;
    }

    /// Get the current roster of clients
    pub fn clients(&self) -> impl Iterator<Item = &ClientId> {
        self.0.iter()
    }
}

/// Whether a client connected or disconnected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Connected,
    Disconnected,
}
