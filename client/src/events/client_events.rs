use std::{mem, vec::IntoIter};

use helm_shared::{ConnectionKey, EntityId};

pub struct ClientEvents<E> {
    connections: Vec<ConnectionKey>,
    disconnections: Vec<ConnectionKey>,
    spawns: Vec<(EntityId, Option<E>)>,
    despawns: Vec<(EntityId, Option<E>)>,
    owner_changes: Vec<(EntityId, bool)>,

    empty: bool,
}

impl<E> Default for ClientEvents<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ClientEvents<E> {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            spawns: Vec::new(),
            despawns: Vec::new(),
            owner_changes: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ClientEvent<E>>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ClientEvent<E>>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, connection_key: &ConnectionKey) {
        self.connections.push(*connection_key);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, connection_key: &ConnectionKey) {
        self.disconnections.push(*connection_key);
        self.empty = false;
    }

    pub(crate) fn push_spawn(&mut self, entity_id: EntityId, world_entity: Option<E>) {
        self.spawns.push((entity_id, world_entity));
        self.empty = false;
    }

    pub(crate) fn push_despawn(&mut self, entity_id: EntityId, world_entity: Option<E>) {
        self.despawns.push((entity_id, world_entity));
        self.empty = false;
    }

    pub(crate) fn push_owner_change(&mut self, entity_id: EntityId, is_owner: bool) {
        self.owner_changes.push((entity_id, is_owner));
        self.empty = false;
    }
}

// Event Trait
pub trait ClientEvent<E> {
    type Iter;

    fn iter(events: &mut ClientEvents<E>) -> Self::Iter;

    fn has(events: &ClientEvents<E>) -> bool;
}

// ConnectEvent
pub struct ConnectEvent;
impl<E> ClientEvent<E> for ConnectEvent {
    type Iter = IntoIter<ConnectionKey>;

    fn iter(events: &mut ClientEvents<E>) -> Self::Iter {
        let list = mem::take(&mut events.connections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents<E>) -> bool {
        !events.connections.is_empty()
    }
}

// DisconnectEvent
pub struct DisconnectEvent;
impl<E> ClientEvent<E> for DisconnectEvent {
    type Iter = IntoIter<ConnectionKey>;

    fn iter(events: &mut ClientEvents<E>) -> Self::Iter {
        let list = mem::take(&mut events.disconnections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents<E>) -> bool {
        !events.disconnections.is_empty()
    }
}

// SpawnEntityEvent
pub struct SpawnEntityEvent;
impl<E> ClientEvent<E> for SpawnEntityEvent {
    type Iter = IntoIter<(EntityId, Option<E>)>;

    fn iter(events: &mut ClientEvents<E>) -> Self::Iter {
        let list = mem::take(&mut events.spawns);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents<E>) -> bool {
        !events.spawns.is_empty()
    }
}

// DespawnEntityEvent, fired for both destroyed and hidden entities
pub struct DespawnEntityEvent;
impl<E> ClientEvent<E> for DespawnEntityEvent {
    type Iter = IntoIter<(EntityId, Option<E>)>;

    fn iter(events: &mut ClientEvents<E>) -> Self::Iter {
        let list = mem::take(&mut events.despawns);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents<E>) -> bool {
        !events.despawns.is_empty()
    }
}

// OwnerChangeEvent
pub struct OwnerChangeEvent;
impl<E> ClientEvent<E> for OwnerChangeEvent {
    type Iter = IntoIter<(EntityId, bool)>;

    fn iter(events: &mut ClientEvents<E>) -> Self::Iter {
        let list = mem::take(&mut events.owner_changes);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents<E>) -> bool {
        !events.owner_changes.is_empty()
    }
}
