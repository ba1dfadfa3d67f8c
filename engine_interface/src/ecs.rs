//! # Entity Component System
//!
//! Components are plain `Copy` types, stored by the host as bincode-encoded bytes keyed by
//! their [ComponentId]. Plugins never hold references into host storage; they read a
//! snapshot of queried components through [QueryResult] and write back through
//! [EngineIo](crate::plugin::EngineIo) commands.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    const_hash,
    serial::{deserialize, EcsData},
};

/// A single requirement in a query
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryComponent {
    /// Component ID queried
    pub component: ComponentId,
    /// Access level granted to this component
    pub access: Access,
}

/// A description of an ECS query
#[derive(Default, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub intersect: Vec<QueryComponent>,
}

/// Universally-unique Entity ID
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u128);

/// Component ID, a hash of the namespaced component name
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub u128);

/// Access level for the given component
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    /// Read only
    Read,
    /// Read and write access
    Write,
}

/// Trait describing an ECS component
// Copy bound here is to discourage variable-sized types!
pub trait Component: Serialize + DeserializeOwned + Copy {
    /// Unique ID of this component
    const ID: ComponentId;
}

impl ComponentId {
    /// Create an id from the given (ideally namespaced) name
    pub const fn new(name: &str) -> Self {
        Self(const_hash(name))
    }
}

impl QueryComponent {
    pub fn new<T: Component>(access: Access) -> Self {
        Self {
            component: T::ID,
            access,
        }
    }
}

/// ECS data relevant to a query, as of the start of the dispatch
pub struct QueryResult {
    /// ECS data from host
    ecs: EcsData,
    /// The original query, for reference
    query: Query,
}

impl QueryResult {
    pub fn new(ecs: EcsData, query: Query) -> Self {
        Self { ecs, query }
    }

    /// Read the data in the given component, if the entity has it and it was queried
    pub fn read<C: Component>(&self, entity: EntityId) -> Option<C> {
        let raw = self.ecs.get(&C::ID)?.get(&entity)?;
        match deserialize(raw.as_slice()) {
            Ok(c) => Some(c),
            Err(e) => {
                log::error!("Failed to deserialize component {:?}: {}", C::ID, e);
                None
            }
        }
    }
}

impl Query {
    /// Creates a new Query, assigning the label `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            intersect: vec![],
        }
    }

    /// Require this component to be present for each entity returned by this query.
    pub fn intersect<T: Component>(mut self, access: Access) -> Self {
        self.intersect.push(QueryComponent::new::<T>(access));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::serialize;

    #[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
    struct Counter(u32);

    impl Component for Counter {
        const ID: ComponentId = ComponentId::new("test/Counter");
    }

    #[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
    struct Tag;

    impl Component for Tag {
        const ID: ComponentId = ComponentId::new("test/Tag");
    }

    fn sample() -> EcsData {
        let mut ecs = EcsData::default();
        let counters = ecs.entry(Counter::ID).or_default();
        counters.insert(EntityId(1), serialize(&Counter(5)).unwrap());
        counters.insert(EntityId(2), serialize(&Counter(7)).unwrap());
        ecs.entry(Tag::ID)
            .or_default()
            .insert(EntityId(2), serialize(&Tag).unwrap());
        ecs
    }

    #[test]
    fn reads_queried_components() {
        let query = Query::new("q")
            .intersect::<Counter>(Access::Read)
            .intersect::<Tag>(Access::Read);
        let result = QueryResult::new(sample(), query);
        assert_eq!(result.read::<Counter>(EntityId(2)), Some(Counter(7)));
        assert_eq!(result.read::<Tag>(EntityId(2)), Some(Tag));
        assert_eq!(result.read::<Tag>(EntityId(1)), None);
    }

    #[test]
    fn unknown_entity_reads_nothing() {
        let query = Query::new("q").intersect::<Counter>(Access::Read);
        let result = QueryResult::new(sample(), query);
        assert_eq!(result.read::<Counter>(EntityId(99)), None);
    }

    #[test]
    fn malformed_data_reads_nothing() {
        let mut ecs = sample();
        ecs.entry(Counter::ID)
            .or_default()
            .insert(EntityId(3), vec![1]);
        let query = Query::new("q").intersect::<Counter>(Access::Read);
        let result = QueryResult::new(ecs, query);
        assert_eq!(result.read::<Counter>(EntityId(3)), None);
    }
}
