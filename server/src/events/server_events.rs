use std::{mem, vec::IntoIter};

use helm_shared::{ConnectionKey, EntityId};

use crate::ServerError;

pub struct ServerEvents {
    connections: Vec<ConnectionKey>,
    disconnections: Vec<(ConnectionKey, Vec<EntityId>)>,
    readies: Vec<ConnectionKey>,
    errors: Vec<ServerError>,

    empty: bool,
}

impl Default for ServerEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            readies: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ServerEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ServerEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, connection_key: &ConnectionKey) {
        self.connections.push(*connection_key);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(
        &mut self,
        connection_key: &ConnectionKey,
        revoked: Vec<EntityId>,
    ) {
        self.disconnections.push((*connection_key, revoked));
        self.empty = false;
    }

    pub(crate) fn push_ready(&mut self, connection_key: &ConnectionKey) {
        self.readies.push(*connection_key);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ServerError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait ServerEvent {
    type Iter;

    fn iter(events: &mut ServerEvents) -> Self::Iter;

    fn has(events: &ServerEvents) -> bool;
}

// ConnectEvent
pub struct ConnectEvent;
impl ServerEvent for ConnectEvent {
    type Iter = IntoIter<ConnectionKey>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.connections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.connections.is_empty()
    }
}

// DisconnectEvent, carries the entities whose ownership was revoked
pub struct DisconnectEvent;
impl ServerEvent for DisconnectEvent {
    type Iter = IntoIter<(ConnectionKey, Vec<EntityId>)>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.disconnections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.disconnections.is_empty()
    }
}

// ReadyEvent
pub struct ReadyEvent;
impl ServerEvent for ReadyEvent {
    type Iter = IntoIter<ConnectionKey>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.readies);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.readies.is_empty()
    }
}

// Error Event
pub struct ErrorEvent;
impl ServerEvent for ErrorEvent {
    type Iter = IntoIter<ServerError>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.errors.is_empty()
    }
}
