use std::collections::{HashMap, HashSet};

use helm_shared::{ConnectionKey, EntityId};

#[derive(Default)]
struct EntityRecord {
    owner: Option<ConnectionKey>,
    observers: HashSet<ConnectionKey>,
    // connections the entity was explicitly hidden from
    hidden_from: HashSet<ConnectionKey>,
}

/// Single source of truth for who owns which entity, which entity is each
/// connection's player, and which connections can see which entity.
///
/// An entity has at most one owner, and no two connections share a player.
/// Every mutation keeps both sides of the player link consistent.
#[derive(Default)]
pub struct EntityAuthorityTable {
    records: HashMap<EntityId, EntityRecord>,
    players: HashMap<ConnectionKey, EntityId>,
}

impl EntityAuthorityTable {
    pub fn new() -> Self {
        Self::default()
    }

    // Entities

    pub fn insert_entity(&mut self, entity: EntityId) {
        self.records.entry(entity).or_default();
    }

    /// Drops every record of `entity`, including any player link to it.
    /// Returns the owner it had.
    pub fn remove_entity(&mut self, entity: &EntityId) -> Option<ConnectionKey> {
        let record = self.records.remove(entity)?;
        if let Some(owner) = record.owner {
            if self.players.get(&owner) == Some(entity) {
                self.players.remove(&owner);
            }
        }
        record.owner
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.records.contains_key(entity)
    }

    pub fn entities(&self) -> Vec<EntityId> {
        let mut output: Vec<EntityId> = self.records.keys().copied().collect();
        output.sort();
        output
    }

    // Ownership

    /// Makes `connection` the owner of `entity` and `entity` its player.
    /// A previous owner loses its player link to `entity`, and a previous
    /// player of `connection` stops being its player.
    pub fn grant(&mut self, entity: EntityId, connection: ConnectionKey) {
        let record = self.records.entry(entity).or_default();
        if let Some(previous_owner) = record.owner.replace(connection) {
            if previous_owner != connection && self.players.get(&previous_owner) == Some(&entity) {
                self.players.remove(&previous_owner);
            }
        }
        self.players.insert(connection, entity);
    }

    /// Clears `connection`'s player link and its ownership of that entity
    pub fn revoke(&mut self, connection: &ConnectionKey) -> Option<EntityId> {
        let entity = self.players.remove(connection)?;
        if let Some(record) = self.records.get_mut(&entity) {
            if record.owner == Some(*connection) {
                record.owner = None;
            }
        }
        Some(entity)
    }

    /// Clears only `connection`'s player link, ownership is kept
    pub fn release_player(&mut self, connection: &ConnectionKey) -> Option<EntityId> {
        self.players.remove(connection)
    }

    /// Sets the owner of `entity` without touching player links, other
    /// than clearing a previous owner's link to `entity`.
    /// Returns the previous owner.
    pub fn set_owner(
        &mut self,
        entity: EntityId,
        owner: Option<ConnectionKey>,
    ) -> Option<ConnectionKey> {
        let record = self.records.entry(entity).or_default();
        let previous = std::mem::replace(&mut record.owner, owner);
        if let Some(previous_owner) = previous {
            if Some(previous_owner) != owner && self.players.get(&previous_owner) == Some(&entity)
            {
                self.players.remove(&previous_owner);
            }
        }
        previous
    }

    pub fn owner(&self, entity: &EntityId) -> Option<ConnectionKey> {
        self.records.get(entity).and_then(|record| record.owner)
    }

    pub fn player_of(&self, connection: &ConnectionKey) -> Option<EntityId> {
        self.players.get(connection).copied()
    }

    /// The connection whose player is `entity`
    pub fn player_connection(&self, entity: &EntityId) -> Option<ConnectionKey> {
        self.players
            .iter()
            .find(|(_, player)| *player == entity)
            .map(|(connection, _)| *connection)
    }

    pub fn owned_by(&self, connection: &ConnectionKey) -> Vec<EntityId> {
        let mut output: Vec<EntityId> = self
            .records
            .iter()
            .filter(|(_, record)| record.owner == Some(*connection))
            .map(|(entity, _)| *entity)
            .collect();
        output.sort();
        output
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    // Visibility

    /// Returns whether `connection` was newly added
    pub fn add_observer(&mut self, entity: &EntityId, connection: ConnectionKey) -> bool {
        let Some(record) = self.records.get_mut(entity) else {
            return false;
        };
        record.hidden_from.remove(&connection);
        record.observers.insert(connection)
    }

    /// Returns whether `connection` was an observer
    pub fn remove_observer(&mut self, entity: &EntityId, connection: &ConnectionKey) -> bool {
        match self.records.get_mut(entity) {
            Some(record) => record.observers.remove(connection),
            None => false,
        }
    }

    /// Removes `connection` as an observer and keeps it from being re-added
    /// implicitly. Returns whether it was an observer.
    pub fn hide(&mut self, entity: &EntityId, connection: ConnectionKey) -> bool {
        let Some(record) = self.records.get_mut(entity) else {
            return false;
        };
        record.hidden_from.insert(connection);
        record.observers.remove(&connection)
    }

    pub fn is_hidden(&self, entity: &EntityId, connection: &ConnectionKey) -> bool {
        self.records
            .get(entity)
            .is_some_and(|record| record.hidden_from.contains(connection))
    }

    pub fn is_observer(&self, entity: &EntityId, connection: &ConnectionKey) -> bool {
        self.records
            .get(entity)
            .is_some_and(|record| record.observers.contains(connection))
    }

    pub fn observers(&self, entity: &EntityId) -> Vec<ConnectionKey> {
        let Some(record) = self.records.get(entity) else {
            return Vec::new();
        };
        let mut output: Vec<ConnectionKey> = record.observers.iter().copied().collect();
        output.sort();
        output
    }

    /// Entities visible to `connection`
    pub fn observed_by(&self, connection: &ConnectionKey) -> Vec<EntityId> {
        let mut output: Vec<EntityId> = self
            .records
            .iter()
            .filter(|(_, record)| record.observers.contains(connection))
            .map(|(entity, _)| *entity)
            .collect();
        output.sort();
        output
    }

    // Connections

    /// Disconnect cleanup. Drops the player link, ownership, and visibility
    /// of `connection`. Returns the entities whose ownership was revoked.
    pub fn remove_connection(&mut self, connection: &ConnectionKey) -> Vec<EntityId> {
        self.players.remove(connection);
        let mut revoked = Vec::new();
        for (entity, record) in self.records.iter_mut() {
            if record.owner == Some(*connection) {
                record.owner = None;
                revoked.push(*entity);
            }
            record.observers.remove(connection);
            record.hidden_from.remove(connection);
        }
        revoked.sort();
        revoked
    }

    /// Whether `connection` appears anywhere in the table
    pub fn references_connection(&self, connection: &ConnectionKey) -> bool {
        self.players.contains_key(connection)
            || self.records.values().any(|record| {
                record.owner == Some(*connection)
                    || record.observers.contains(connection)
                    || record.hidden_from.contains(connection)
            })
    }
}
