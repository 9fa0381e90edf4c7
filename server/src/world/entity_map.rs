use std::{collections::HashMap, hash::Hash};

use helm_shared::{BigMap, EntityId};

/// Two-way map between world entities and the ids the server assigned them
pub struct EntityMap<E: Copy + Eq + Hash> {
    entity_to_id_map: HashMap<E, EntityId>,
    id_to_entity_map: BigMap<EntityId, E>,
}

impl<E: Copy + Eq + Hash> Default for EntityMap<E> {
    fn default() -> Self {
        Self {
            entity_to_id_map: HashMap::new(),
            id_to_entity_map: BigMap::new(),
        }
    }
}

impl<E: Copy + Eq + Hash> EntityMap<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a fresh id to `world_entity`. Ids are never reused.
    pub fn insert(&mut self, world_entity: E) -> EntityId {
        let entity_id = self.id_to_entity_map.insert(world_entity);
        self.entity_to_id_map.insert(world_entity, entity_id);
        entity_id
    }

    pub fn remove_by_id(&mut self, entity_id: &EntityId) -> Option<E> {
        let world_entity = self.id_to_entity_map.remove(entity_id)?;
        self.entity_to_id_map.remove(&world_entity);
        Some(world_entity)
    }

    pub fn entity_id(&self, world_entity: &E) -> Option<EntityId> {
        self.entity_to_id_map.get(world_entity).copied()
    }

    pub fn world_entity(&self, entity_id: &EntityId) -> Option<E> {
        self.id_to_entity_map.get(entity_id).copied()
    }

    pub fn contains_entity(&self, world_entity: &E) -> bool {
        self.entity_to_id_map.contains_key(world_entity)
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.id_to_entity_map.keys()
    }

    pub fn len(&self) -> usize {
        self.id_to_entity_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_entity_map.is_empty()
    }
}
