//! Host-side bookkeeping for replicated components.
//!
//! A plugin asks for replication with [EngineCommand::Synchronize]. From then on the host
//! diffs the listed components of that entity against the last value it exchanged with the
//! network (initially, the value at registration), and only changed values are exported.
//! Updates arriving for a group the plugin has not registered yet are held until it does, so
//! a late participant starts from the current network state instead of its own defaults.
//!
//! [EngineCommand::Synchronize]: colorcube_engine_interface::plugin::EngineCommand::Synchronize
use std::collections::HashMap;

use anyhow::Result;
use colorcube_engine_interface::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ecs::Ecs;

/// One replicated component value, as it travels between participants
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatedComponent {
    pub group: SyncGroupId,
    pub component: ComponentId,
    pub data: Vec<u8>,
}

struct Replica {
    entity: EntityId,
    components: Vec<ComponentId>,
    /// Last value sent to or received from the network
    last: HashMap<ComponentId, Vec<u8>>,
}

#[derive(Default)]
pub struct Replication {
    replicas: HashMap<SyncGroupId, Replica>,
    pending: HashMap<(SyncGroupId, ComponentId), Vec<u8>>,
}

impl Replication {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-assert) replication of `components` on `entity` under `group`.
    /// Pending network values for the group are written into the ECS first.
    pub fn register(
        &mut self,
        ecs: &mut Ecs,
        entity: EntityId,
        components: &[ComponentId],
        group: SyncGroupId,
    ) -> Result<()> {
        let replica = self.replicas.entry(group).or_insert_with(|| Replica {
            entity,
            components: vec![],
            last: HashMap::new(),
        });

        if replica.entity != entity {
            log::warn!(
                "Sync group {:?} moved from {:?} to {:?}",
                group,
                replica.entity,
                entity
            );
            replica.entity = entity;
            replica.last.clear();
        }

        for &component in components {
            if !replica.components.contains(&component) {
                replica.components.push(component);
            }

            if let Some(data) = self.pending.remove(&(group, component)) {
                ecs.add_component_raw(entity, component, &data)?;
                replica.last.insert(component, data);
            } else if !replica.last.contains_key(&component) {
                // The value at registration is the baseline, not a change
                if let Some(current) = ecs.get_raw(entity, component) {
                    replica.last.insert(component, current.to_vec());
                }
            }
        }

        ecs.add_component(entity, &Synchronized(group))
    }

    /// Whether the group has been registered locally
    pub fn is_registered(&self, group: SyncGroupId) -> bool {
        self.replicas.contains_key(&group)
    }

    /// Collect every replicated component whose value changed since the last exchange
    pub fn export(&mut self, ecs: &Ecs) -> Vec<ReplicatedComponent> {
        let mut out = vec![];
        for (&group, replica) in &mut self.replicas {
            for &component in &replica.components {
                let Some(current) = ecs.get_raw(replica.entity, component) else {
                    continue;
                };

                if replica.last.get(&component).map(Vec::as_slice) != Some(current) {
                    replica.last.insert(component, current.to_vec());
                    out.push(ReplicatedComponent {
                        group,
                        component,
                        data: current.to_vec(),
                    });
                }
            }
        }
        out
    }

    /// Apply values received from the network
    pub fn import(&mut self, ecs: &mut Ecs, updates: Vec<ReplicatedComponent>) -> Result<()> {
        for update in updates {
            match self.replicas.get_mut(&update.group) {
                Some(replica) if replica.components.contains(&update.component) => {
                    ecs.add_component_raw(replica.entity, update.component, &update.data)?;
                    replica.last.insert(update.component, update.data);
                }
                _ => {
                    self.pending
                        .insert((update.group, update.component), update.data);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOR: ComponentId = ComponentId(0xC010);
    const GROUP: SyncGroupId = SyncGroupId(1);

    fn setup(value: u8) -> (Ecs, EntityId) {
        let mut ecs = Ecs::new();
        let e = EntityId(1);
        ecs.import_entity(e);
        ecs.add_component_raw(e, COLOR, &[value]).unwrap();
        (ecs, e)
    }

    #[test]
    fn exports_only_changes() {
        let (mut ecs, e) = setup(1);
        let mut rep = Replication::new();
        rep.register(&mut ecs, e, &[COLOR], GROUP).unwrap();

        assert!(rep.export(&ecs).is_empty());

        // Re-asserting the same value is a no-op on the wire
        rep.register(&mut ecs, e, &[COLOR], GROUP).unwrap();
        assert!(rep.export(&ecs).is_empty());

        ecs.add_component_raw(e, COLOR, &[2]).unwrap();
        let changed = rep.export(&ecs);
        assert_eq!(changed[0].data, vec![2]);
    }

    #[test]
    fn imports_are_not_echoed() {
        let (mut ecs, e) = setup(1);
        let mut rep = Replication::new();
        rep.register(&mut ecs, e, &[COLOR], GROUP).unwrap();
        rep.export(&ecs);

        let update = ReplicatedComponent {
            group: GROUP,
            component: COLOR,
            data: vec![9],
        };
        rep.import(&mut ecs, vec![update]).unwrap();
        assert_eq!(ecs.get_raw(e, COLOR), Some(&[9u8][..]));
        assert!(rep.export(&ecs).is_empty());
    }

    #[test]
    fn pending_applies_on_registration() {
        let (mut ecs, e) = setup(0);
        let mut rep = Replication::new();
        let update = ReplicatedComponent {
            group: GROUP,
            component: COLOR,
            data: vec![5],
        };
        rep.import(&mut ecs, vec![update]).unwrap();
        assert_eq!(ecs.get_raw(e, COLOR), Some(&[0u8][..]));

        rep.register(&mut ecs, e, &[COLOR], GROUP).unwrap();
        assert_eq!(ecs.get_raw(e, COLOR), Some(&[5u8][..]));
        assert!(rep.export(&ecs).is_empty());
        assert_eq!(
            ecs.get::<Synchronized>(e).unwrap(),
            Some(Synchronized(GROUP))
        );
    }
}
