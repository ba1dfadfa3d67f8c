//! In-memory network joining several engines into one session.
//!
//! Broadcast traffic is delivered at most once, in no particular order, and never back to its
//! sender. Replicated components are relayed only while the hub is online; when several
//! participants change the same component in one exchange, the last one relayed wins
//! everywhere, including on the participants whose change lost.
use std::collections::HashMap;

use anyhow::Result;
use colorcube_engine_interface::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{replication::ReplicatedComponent, Engine};

/// Delivery behaviour of the hub
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Seed for shuffling and dropping
    pub seed: u64,
    /// Shuffle broadcast messages before delivery
    pub shuffle: bool,
    /// Probability that a broadcast message is lost on its way to any one peer. Clamped to
    /// `0..=1`, and non-finite values count as zero.
    pub drop_probability: f64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            shuffle: true,
            drop_probability: 0.,
        }
    }
}

pub struct LoopbackHub {
    rng: StdRng,
    config: HubConfig,
    online: bool,
    /// Latest relayed value of every replicated component
    authoritative: HashMap<(SyncGroupId, ComponentId), Vec<u8>>,
}

impl LoopbackHub {
    pub fn new(mut config: HubConfig) -> Self {
        if !config.drop_probability.is_finite() {
            log::warn!(
                "Drop probability {} is not finite, delivering everything",
                config.drop_probability
            );
            config.drop_probability = 0.;
        }
        config.drop_probability = config.drop_probability.clamp(0., 1.);

        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            online: false,
            authoritative: HashMap::new(),
        }
    }

    /// Whether replication is currently available
    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn set_online(&mut self, online: bool) {
        if online != self.online {
            log::info!("Replication {}", if online { "online" } else { "offline" });
        }
        self.online = online;
    }

    /// Current network-wide replicated state, for participants joining late
    pub fn snapshot(&self) -> Vec<ReplicatedComponent> {
        self.authoritative
            .iter()
            .map(|(&(group, component), data)| ReplicatedComponent {
                group,
                component,
                data: data.clone(),
            })
            .collect()
    }

    /// Move one round of traffic between the given engines
    pub fn exchange(&mut self, engines: &mut [&mut Engine]) -> Result<()> {
        self.relay_broadcasts(engines);

        for engine in engines.iter_mut() {
            engine.set_synchronized(self.online);
        }

        if self.online {
            self.relay_replicated(engines)?;
        }

        Ok(())
    }

    fn relay_broadcasts(&mut self, engines: &mut [&mut Engine]) {
        let mut traffic: Vec<(usize, MessageData)> = engines
            .iter_mut()
            .enumerate()
            .flat_map(|(i, e)| e.network_outbox().into_iter().map(move |m| (i, m)))
            .collect();

        if self.config.shuffle {
            traffic.shuffle(&mut self.rng);
        }

        for (origin, msg) in traffic {
            for (j, engine) in engines.iter_mut().enumerate() {
                if j == origin {
                    continue;
                }

                if self.rng.gen_bool(self.config.drop_probability) {
                    log::debug!("Dropped message from peer {} to peer {}", origin, j);
                    continue;
                }

                engine.broadcast(msg.clone());
            }
        }
    }

    fn relay_replicated(&mut self, engines: &mut [&mut Engine]) -> Result<()> {
        // Later exports overwrite earlier ones
        let mut winners: HashMap<(SyncGroupId, ComponentId), (usize, Vec<u8>)> = HashMap::new();
        for (i, engine) in engines.iter_mut().enumerate() {
            for update in engine.export_replicated() {
                winners.insert((update.group, update.component), (i, update.data));
            }
        }

        for (&key, (origin, data)) in &winners {
            self.authoritative.insert(key, data.clone());

            for (j, engine) in engines.iter_mut().enumerate() {
                if j == *origin {
                    continue;
                }

                engine.import_replicated(vec![ReplicatedComponent {
                    group: key.0,
                    component: key.1,
                    data: data.clone(),
                }])?;
            }
        }

        Ok(())
    }
}
