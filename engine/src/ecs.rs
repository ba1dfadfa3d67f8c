use ahash::RandomState;
use anyhow::{ensure, Result};
use colorcube_engine_interface::{
    prelude::*,
    serial::{deserialize, serialize, EcsData},
};
use std::collections::{HashMap, HashSet};

type ComponentData = Vec<u8>;
pub type EcsMap =
    HashMap<ComponentId, HashMap<EntityId, ComponentData, RandomState>, RandomState>;

/// Rather poor ECS implementation for prototyping
#[derive(Default)]
pub struct Ecs {
    map: EcsMap,
    entities: HashSet<EntityId, RandomState>,
}

impl Ecs {
    /// Creates a new ECS world
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the set of entities having every queried component.
    /// Empty queries, and queries for components nobody has, return nothing.
    pub fn query(&self, query: &[QueryComponent]) -> HashSet<EntityId> {
        let Some((init, rest)) = query.split_first() else {
            return HashSet::new();
        };

        // Initialize to the entities in the first term..
        let mut entities: HashSet<EntityId> = match self.map.get(&init.component) {
            Some(comp) => comp.keys().copied().collect(),
            None => return HashSet::new(),
        };

        // Filter for the rest
        for term in rest {
            match self.map.get(&term.component) {
                Some(comp) => entities.retain(|ent| comp.contains_key(ent)),
                None => return HashSet::new(),
            }
        }

        entities
    }

    /// Import an entity ID from elsewhere
    pub fn import_entity(&mut self, id: EntityId) {
        self.entities.insert(id);
    }

    /// Add component to entity, or overwrite existing data
    pub fn add_component_raw(
        &mut self,
        entity: EntityId,
        component: ComponentId,
        data: &[u8],
    ) -> Result<()> {
        ensure!(
            self.entities.contains(&entity),
            "Entity {:?} not found, cannot add component {:?}",
            entity,
            component
        );

        let comp = self.map.entry(component).or_default();
        match comp.get_mut(&entity) {
            Some(buf) => {
                buf.clear();
                buf.extend_from_slice(data);
            }
            None => {
                comp.insert(entity, data.to_vec());
            }
        }

        Ok(())
    }

    /// Add a typed component to an entity
    pub fn add_component<C: Component>(&mut self, entity: EntityId, data: &C) -> Result<()> {
        self.add_component_raw(entity, C::ID, &serialize(data)?)
    }

    /// Get data associated with a component
    pub fn get_raw(&self, entity: EntityId, component: ComponentId) -> Option<&[u8]> {
        self.map
            .get(&component)?
            .get(&entity)
            .map(|data| data.as_slice())
    }

    /// Get a typed component
    pub fn get<C: Component>(&self, entity: EntityId) -> Result<Option<C>> {
        match self.get_raw(entity, C::ID) {
            Some(raw) => Ok(Some(deserialize(raw)?)),
            None => Ok(None),
        }
    }

    /// Copy out the data a system's query asks for
    pub fn query_data(&self, query: &Query) -> EcsData {
        let entities = self.query(&query.intersect);
        let mut data = EcsData::new();

        for term in &query.intersect {
            let out = data.entry(term.component).or_default();
            for &entity in &entities {
                if let Some(raw) = self.get_raw(entity, term.component) {
                    out.insert(entity, raw.to_vec());
                }
            }
        }

        data
    }

    /// Estimate bytes used by all component storage. Does not include ECS overhead.
    pub fn estimate_mem_usage(&self) -> usize {
        self.map
            .values()
            .flat_map(|comp| comp.values())
            .map(|data| data.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMP_A: ComponentId = ComponentId(0xDEADBEEF);
    const COMP_B: ComponentId = ComponentId(0xB00FCAFE);

    fn term(component: ComponentId) -> QueryComponent {
        QueryComponent {
            component,
            access: Access::Read,
        }
    }

    #[test]
    fn test_ecs_basic() {
        let mut ecs = Ecs::new();

        let test_val = 0x1337_3621_0420_6969_u64;
        let e = EntityId(1);
        ecs.import_entity(e);
        ecs.add_component_raw(e, COMP_A, &test_val.to_le_bytes())
            .unwrap();

        let entities = ecs.query(&[term(COMP_A)]);
        assert_eq!(entities.len(), 1);
        assert_eq!(ecs.estimate_mem_usage(), 8);

        for ent in entities {
            let buf = ecs.get_raw(ent, COMP_A).unwrap();
            let val = u64::from_le_bytes(buf.try_into().unwrap());
            assert_eq!(val, test_val);
        }
    }

    #[test]
    fn test_ecs_intermediate() {
        let mut ecs = Ecs::new();

        for i in 0..100u64 {
            let e = EntityId(u128::from(i));
            ecs.import_entity(e);
            if i < 50 {
                ecs.add_component_raw(e, COMP_B, &i.to_le_bytes()).unwrap();
            }
            ecs.add_component_raw(e, COMP_A, &0x1337_u64.to_le_bytes())
                .unwrap();
        }

        let entities = ecs.query(&[term(COMP_A), term(COMP_B)]);

        let mut showed_up = vec![false; 50];
        for ent in entities {
            let buf = ecs.get_raw(ent, COMP_B).unwrap();
            let val = u64::from_le_bytes(buf.try_into().unwrap());
            showed_up[val as usize] = true;
        }
        assert!(showed_up.iter().all(|&v| v));

        assert_eq!(ecs.query(&[term(COMP_A)]).len(), 100);
        assert_eq!(ecs.query(&[term(COMP_B)]).len(), 50);
    }

    #[test]
    fn unknown_entity_is_an_error() {
        let mut ecs = Ecs::new();
        assert!(ecs.add_component_raw(EntityId(7), COMP_A, &[1]).is_err());
    }

    #[test]
    fn missing_component_query_is_empty() {
        let mut ecs = Ecs::new();
        let e = EntityId(1);
        ecs.import_entity(e);
        ecs.add_component_raw(e, COMP_A, &[1]).unwrap();
        assert!(ecs.query(&[term(COMP_A), term(COMP_B)]).is_empty());
        assert!(ecs.query(&[]).is_empty());
    }

}
