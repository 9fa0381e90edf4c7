use std::{fmt::Debug, hash::Hash, mem};

use log::{debug, info, warn};

use helm_shared::{
    AssetId, BigMap, ChangeOwnerMessage, Connection, ConnectionKey, EntityId, MessageContainer,
    MessageKinds, MessageReceiver, MessageSender, NotReadyMessage, ObjectDestroyMessage,
    ObjectHideMessage, Protocol, ReadyMessage, SpawnMessage, TypedMessage, WorldMutType,
    WorldRefType,
};

use crate::{
    events::ServerEvents,
    world::{
        authority_table::EntityAuthorityTable, entity_map::EntityMap, entity_owner::EntityOwner,
    },
    ServerConfig, ServerError,
};

/// The authoritative side of a session. Tracks connections, spawns entities
/// to them, decides who owns what, and holds back entity traffic from
/// connections that are not ready.
pub struct Server<E: Copy + Eq + Hash + Debug> {
    server_config: ServerConfig,
    message_kinds: MessageKinds,
    active: bool,
    // Connections
    connections: BigMap<ConnectionKey, Connection>,
    local_connection: Option<ConnectionKey>,
    // Entities
    entity_map: EntityMap<E>,
    authority: EntityAuthorityTable,
    // Events
    incoming_events: ServerEvents,
}

impl<E: Copy + Eq + Hash + Debug> Server<E> {
    /// Create a new Server
    pub fn new<P: Into<Protocol>>(server_config: ServerConfig, protocol: P) -> Self {
        let protocol: Protocol = protocol.into();

        let Protocol { message_kinds, .. } = protocol;

        Self {
            server_config,
            message_kinds,
            active: false,
            connections: BigMap::new(),
            local_connection: None,
            entity_map: EntityMap::new(),
            authority: EntityAuthorityTable::new(),
            incoming_events: ServerEvents::new(),
        }
    }

    /// Starts accepting connections and spawning entities
    pub fn listen(&mut self) {
        if self.active {
            return;
        }
        info!("Server is listening");
        self.active = true;
    }

    /// Returns whether or not the Server is listening for connections
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Disconnects every connection and stops listening
    pub fn shutdown(&mut self) {
        for connection_key in self.connections.keys() {
            self.disconnect(&connection_key);
        }
        self.active = false;
        info!("Server shut down");
    }

    // Connections

    /// Accepts a link to a peer in another process. The connection is not
    /// ready until the peer says so.
    pub fn accept_connection(
        &mut self,
        sender: Box<dyn MessageSender>,
        receiver: Box<dyn MessageReceiver>,
    ) -> Result<ConnectionKey, ServerError> {
        self.check_accept()?;

        let connection_key = self.connections.next_key();
        let connection = Connection::new(connection_key, sender, receiver);
        let connection_key = self.connections.insert(connection);
        self.observe_all(&connection_key);

        info!("Accepted connection {:?}", connection_key);
        self.incoming_events.push_connection(&connection_key);
        Ok(connection_key)
    }

    /// Accepts the link to the client running in this process
    pub fn accept_local_connection<W: WorldRefType<E>>(
        &mut self,
        world: &W,
        sender: Box<dyn MessageSender>,
        receiver: Box<dyn MessageReceiver>,
    ) -> Result<ConnectionKey, ServerError> {
        self.check_accept()?;
        if self.local_connection.is_some() {
            return Err(ServerError::LocalConnectionExists);
        }

        let ready = self.server_config.local_connection_ready;
        let connection_key = self.connections.next_key();
        let connection = Connection::new_local(connection_key, ready, sender, receiver);
        let connection_key = self.connections.insert(connection);
        self.local_connection = Some(connection_key);
        self.observe_all(&connection_key);
        if ready {
            self.send_observed_spawns(world, &connection_key);
        }

        info!("Accepted local connection {:?}", connection_key);
        self.incoming_events.push_connection(&connection_key);
        Ok(connection_key)
    }

    fn check_accept(&self) -> Result<(), ServerError> {
        if !self.active {
            return Err(ServerError::NotActive {
                operation: "accepting connections",
            });
        }
        if let Some(limit) = self.server_config.max_connections {
            if self.connections.len() >= limit {
                return Err(ServerError::ConnectionLimitReached { limit });
            }
        }
        Ok(())
    }

    /// Drops the connection and everything the authority table knows about it.
    /// Returns the entities whose ownership was revoked.
    pub fn disconnect(&mut self, connection_key: &ConnectionKey) -> Option<Vec<EntityId>> {
        self.connections.remove(connection_key)?;
        if self.local_connection == Some(*connection_key) {
            self.local_connection = None;
        }
        let revoked = self.authority.remove_connection(connection_key);

        info!(
            "Connection {:?} disconnected, revoked authority over {} entities",
            connection_key,
            revoked.len()
        );
        self.incoming_events
            .push_disconnection(connection_key, revoked.clone());
        Some(revoked)
    }

    pub fn connection(&self, connection_key: &ConnectionKey) -> Option<&Connection> {
        self.connections.get(connection_key)
    }

    pub fn connection_mut(&mut self, connection_key: &ConnectionKey) -> Option<&mut Connection> {
        self.connections.get_mut(connection_key)
    }

    /// Return a list of all current connections' keys
    pub fn connection_keys(&self) -> Vec<ConnectionKey> {
        self.connections.keys()
    }

    pub fn connections_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of connections that have a player entity
    pub fn num_players(&self) -> usize {
        self.authority.player_count()
    }

    pub fn local_connection(&self) -> Option<ConnectionKey> {
        self.local_connection
    }

    /// Whether a client in this process is connected
    pub fn local_client_active(&self) -> bool {
        self.local_connection.is_some()
    }

    pub fn is_ready(&self, connection_key: &ConnectionKey) -> bool {
        self.connections
            .get(connection_key)
            .is_some_and(|connection| connection.is_ready())
    }

    // Incoming

    /// Services every connection: handles readiness reports, hands other
    /// messages to the connection's handlers, and cleans up links that
    /// went away. Returns the events that accumulated since the last call.
    pub fn receive<W: WorldRefType<E>>(&mut self, world: &W) -> ServerEvents {
        for connection_key in self.connections.keys() {
            let Some(connection) = self.connections.get_mut(&connection_key) else {
                continue;
            };
            let messages = connection.receive_messages();
            let closed = connection.is_closed();

            for message in messages {
                self.receive_message(world, &connection_key, &message);
            }

            if closed {
                self.disconnect(&connection_key);
            }
        }

        mem::take(&mut self.incoming_events)
    }

    fn receive_message<W: WorldRefType<E>>(
        &mut self,
        world: &W,
        connection_key: &ConnectionKey,
        message: &MessageContainer,
    ) {
        if !self.message_kinds.contains(&message.kind()) {
            warn!(
                "Connection {:?} sent unregistered message `{}`",
                connection_key,
                message.name()
            );
            if self.server_config.reject_unregistered_messages {
                self.incoming_events
                    .push_error(ServerError::UnregisteredMessage {
                        key: *connection_key,
                        name: message.name(),
                    });
                return;
            }
        }

        if message.is::<ReadyMessage>() {
            let was_ready = self.is_ready(connection_key);
            if let Err(error) = self.set_client_ready(world, connection_key) {
                self.incoming_events.push_error(error);
            } else if !was_ready {
                self.incoming_events.push_ready(connection_key);
            }
        }

        if let Some(connection) = self.connections.get_mut(connection_key) {
            connection.dispatch(message);
        }
    }

    // Readiness

    /// Marks the connection ready and sends it every entity it observes
    pub fn set_client_ready<W: WorldRefType<E>>(
        &mut self,
        world: &W,
        connection_key: &ConnectionKey,
    ) -> Result<(), ServerError> {
        let connection = self.connection_or_err(connection_key)?;
        if connection.is_ready() {
            debug!("Connection {:?} is already ready", connection_key);
            return Ok(());
        }
        connection.set_ready(true);
        self.send_observed_spawns(world, connection_key);
        Ok(())
    }

    /// Marks the connection not ready and tells it so
    pub fn set_client_not_ready(&mut self, connection_key: &ConnectionKey) -> Result<(), ServerError> {
        let connection = self.connection_or_err(connection_key)?;
        if connection.is_ready() {
            connection.set_ready(false);
            connection.send(&NotReadyMessage);
        }
        Ok(())
    }

    /// Marks every ready connection not ready. Returns how many changed.
    pub fn set_all_clients_not_ready(&mut self) -> usize {
        let mut count = 0;
        for (_, connection) in self.connections.iter_mut() {
            if connection.is_ready() {
                connection.set_ready(false);
                connection.send(&NotReadyMessage);
                count += 1;
            }
        }
        count
    }

    // Messages

    /// Sends to every connection, ready or not
    pub fn send_to_all<M: TypedMessage>(&mut self, message: &M) {
        for (_, connection) in self.connections.iter_mut() {
            connection.send(message);
        }
    }

    pub fn send_to_ready<M: TypedMessage>(&mut self, message: &M) {
        for (_, connection) in self.connections.iter_mut() {
            if connection.is_ready() {
                connection.send(message);
            }
        }
    }

    pub fn send_to_connection<M: TypedMessage>(
        &mut self,
        connection_key: &ConnectionKey,
        message: &M,
    ) -> Result<(), ServerError> {
        self.connection_or_err(connection_key)?.send(message);
        Ok(())
    }

    /// Sends to the connection that owns `world_entity`
    pub fn send_to_client_of_player<M: TypedMessage>(
        &mut self,
        world_entity: &E,
        message: &M,
    ) -> Result<(), ServerError> {
        if !self.active {
            return Err(ServerError::NotActive {
                operation: "sending to the client of a player",
            });
        }
        let entity_id = self.entity_id_or_err(world_entity)?;
        let Some(owner) = self.authority.owner(&entity_id) else {
            return Err(ServerError::NoOwningConnection {
                entity: format!("{:?}", world_entity),
            });
        };
        self.send_to_connection(&owner, message)
    }

    /// Sends to every ready connection that can see `world_entity`
    pub fn send_to_observers<M: TypedMessage>(
        &mut self,
        world_entity: &E,
        message: &M,
    ) -> Result<(), ServerError> {
        let entity_id = self.entity_id_or_err(world_entity)?;
        for connection_key in self.authority.observers(&entity_id) {
            if let Some(connection) = self.connections.get_mut(&connection_key) {
                if connection.is_ready() {
                    connection.send(message);
                }
            }
        }
        Ok(())
    }

    // Entities

    /// Spawns `world_entity` on every connection, optionally owned by `owner`.
    ///
    /// Scene objects are enabled when spawned, prefab instances keep their
    /// current activation.
    pub fn spawn_object<W: WorldMutType<E>>(
        &mut self,
        world: &mut W,
        world_entity: &E,
        owner: Option<ConnectionKey>,
    ) -> Result<EntityId, ServerError> {
        self.check_spawn_active(world_entity)?;
        if let Some(owner) = owner {
            self.connection_or_err(&owner)?;
        }
        self.spawn_inner(world, world_entity, owner, false)
    }

    /// Spawns `world_entity` owned by whichever connection has `player` as
    /// its player
    pub fn spawn_with_player<W: WorldMutType<E>>(
        &mut self,
        world: &mut W,
        world_entity: &E,
        player: &E,
    ) -> Result<EntityId, ServerError> {
        self.check_spawn_active(world_entity)?;
        if world.identity(player).is_none() {
            return Err(ServerError::PlayerHasNoIdentity {
                entity: format!("{:?}", player),
            });
        }
        let owner = self
            .entity_map
            .entity_id(player)
            .and_then(|player_id| self.authority.player_connection(&player_id));
        let Some(owner) = owner else {
            return Err(ServerError::PlayerNotInConnection {
                entity: format!("{:?}", player),
            });
        };
        self.spawn_inner(world, world_entity, Some(owner), false)
    }

    /// Spawns every scene object in the world that has not been spawned yet.
    /// Returns false if the server is not active.
    pub fn spawn_objects<W: WorldMutType<E>>(&mut self, world: &mut W) -> bool {
        if !self.active {
            return false;
        }

        let mut spawned = 0;
        for world_entity in world.entities() {
            let is_scene_object = world
                .identity(&world_entity)
                .is_some_and(|identity| identity.is_scene_object());
            if !is_scene_object || self.entity_map.contains_entity(&world_entity) {
                continue;
            }
            match self.spawn_inner(world, &world_entity, None, false) {
                Ok(_) => spawned += 1,
                Err(error) => warn!("SpawnObjects: {}", error),
            }
        }
        debug!("SpawnObjects spawned {} scene objects", spawned);
        true
    }

    fn spawn_inner<W: WorldMutType<E>>(
        &mut self,
        world: &mut W,
        world_entity: &E,
        owner: Option<ConnectionKey>,
        as_player: bool,
    ) -> Result<EntityId, ServerError> {
        self.check_spawn_active(world_entity)?;
        let Some(identity) = world.identity(world_entity) else {
            return Err(ServerError::NoIdentity {
                entity: format!("{:?}", world_entity),
            });
        };
        if self.entity_map.contains_entity(world_entity) {
            return Err(ServerError::EntityAlreadySpawned {
                entity: format!("{:?}", world_entity),
            });
        }

        if identity.is_scene_object() {
            world.set_active(world_entity, true);
        }

        let entity_id = self.entity_map.insert(*world_entity);
        self.authority.insert_entity(entity_id);
        match (owner, as_player) {
            (Some(owner), true) => self.authority.grant(entity_id, owner),
            (owner, _) => {
                self.authority.set_owner(entity_id, owner);
            }
        }

        for connection_key in self.connections.keys() {
            if self.authority.is_hidden(&entity_id, &connection_key) {
                continue;
            }
            self.authority.add_observer(&entity_id, connection_key);
            if self.is_ready(&connection_key) {
                self.send_spawn(world, &entity_id, &connection_key);
            }
        }

        debug!("Spawned {:?} as {}", world_entity, entity_id);
        Ok(entity_id)
    }

    fn check_spawn_active(&self, world_entity: &E) -> Result<(), ServerError> {
        if !self.active {
            return Err(ServerError::SpawnWhileInactive {
                entity: format!("{:?}", world_entity),
            });
        }
        Ok(())
    }

    /// Despawns `world_entity` everywhere and removes it from the world
    pub fn despawn<W: WorldMutType<E>>(
        &mut self,
        world: &mut W,
        world_entity: &E,
    ) -> Result<EntityId, ServerError> {
        let entity_id = self.entity_id_or_err(world_entity)?;
        self.forget_entity(&entity_id);
        world.despawn_entity(world_entity);
        Ok(entity_id)
    }

    /// Despawns every spawned entity that no longer exists in the world,
    /// e.g. after the scene holding it was unloaded
    pub fn cleanup_missing<W: WorldRefType<E>>(&mut self, world: &W) -> Vec<EntityId> {
        let mut removed = Vec::new();
        for entity_id in self.entity_map.entity_ids() {
            let Some(world_entity) = self.entity_map.world_entity(&entity_id) else {
                continue;
            };
            if !world.has_entity(&world_entity) {
                self.forget_entity(&entity_id);
                removed.push(entity_id);
            }
        }
        removed
    }

    fn forget_entity(&mut self, entity_id: &EntityId) {
        for connection_key in self.authority.observers(entity_id) {
            if let Some(connection) = self.connections.get_mut(&connection_key) {
                if connection.is_ready() {
                    connection.send(&ObjectDestroyMessage { entity: *entity_id });
                }
            }
        }
        self.authority.remove_entity(entity_id);
        self.entity_map.remove_by_id(entity_id);
    }

    // Players

    /// Makes `world_entity` the player of `connection_key`, spawning it if
    /// needed. Returns Ok(false) if the connection already has a player.
    pub fn add_player_for_connection<W: WorldMutType<E>>(
        &mut self,
        world: &mut W,
        connection_key: &ConnectionKey,
        world_entity: &E,
        asset_id: Option<AssetId>,
    ) -> Result<bool, ServerError> {
        self.connection_or_err(connection_key)?;
        self.check_player_candidate(world, connection_key, world_entity)?;

        if let Some(player) = self.authority.player_of(connection_key) {
            warn!(
                "AddPlayer: connection {:?} already has player {}, use ReplacePlayer instead",
                connection_key, player
            );
            return Ok(false);
        }

        if let Some(asset_id) = asset_id {
            if let Some(identity) = world.identity_mut(world_entity) {
                identity.asset_id = Some(asset_id);
            }
        }

        self.assign_player(world, connection_key, world_entity)?;
        Ok(true)
    }

    /// Swaps the player of `connection_key` for `world_entity`. Without
    /// `keep_authority` the previous player goes back to the server.
    pub fn replace_player_for_connection<W: WorldMutType<E>>(
        &mut self,
        world: &mut W,
        connection_key: &ConnectionKey,
        world_entity: &E,
        asset_id: Option<AssetId>,
        keep_authority: bool,
    ) -> Result<(), ServerError> {
        self.connection_or_err(connection_key)?;
        self.check_player_candidate(world, connection_key, world_entity)?;

        if let Some(asset_id) = asset_id {
            if let Some(identity) = world.identity_mut(world_entity) {
                identity.asset_id = Some(asset_id);
            }
        }

        let previous = if keep_authority {
            self.authority.release_player(connection_key)
        } else {
            self.authority.revoke(connection_key)
        };

        self.assign_player(world, connection_key, world_entity)?;

        if let Some(previous) = previous {
            if self.entity_map.entity_id(world_entity) != Some(previous) {
                self.send_owner_change(&previous, connection_key, keep_authority, false);
            }
        }
        Ok(())
    }

    /// Takes the player away from `connection_key`, the entity goes back to
    /// the server
    pub fn remove_player_for_connection(
        &mut self,
        connection_key: &ConnectionKey,
    ) -> Result<Option<EntityId>, ServerError> {
        self.connection_or_err(connection_key)?;
        let previous = self.authority.revoke(connection_key);
        if let Some(previous) = previous {
            self.send_owner_change(&previous, connection_key, false, false);
        }
        Ok(previous)
    }

    fn check_player_candidate<W: WorldRefType<E>>(
        &self,
        world: &W,
        connection_key: &ConnectionKey,
        world_entity: &E,
    ) -> Result<(), ServerError> {
        if world.identity(world_entity).is_none() {
            return Err(ServerError::NoIdentity {
                entity: format!("{:?}", world_entity),
            });
        }
        if let Some(entity_id) = self.entity_map.entity_id(world_entity) {
            if let Some(owner) = self.authority.owner(&entity_id) {
                if owner != *connection_key {
                    return Err(ServerError::OwnedByOtherConnection {
                        entity: format!("{:?}", world_entity),
                    });
                }
            }
        }
        Ok(())
    }

    fn assign_player<W: WorldMutType<E>>(
        &mut self,
        world: &mut W,
        connection_key: &ConnectionKey,
        world_entity: &E,
    ) -> Result<EntityId, ServerError> {
        match self.entity_map.entity_id(world_entity) {
            Some(entity_id) => {
                let previous_owner = self.authority.owner(&entity_id);
                self.authority.grant(entity_id, *connection_key);
                if let Some(previous_owner) = previous_owner {
                    if previous_owner != *connection_key {
                        self.send_owner_change(&entity_id, &previous_owner, false, false);
                    }
                }
                self.send_owner_change(&entity_id, connection_key, true, true);
                Ok(entity_id)
            }
            None => self.spawn_inner(world, world_entity, Some(*connection_key), true),
        }
    }

    // Visibility

    /// Makes `world_entity` visible to the connection. A connection that is
    /// not ready gets the spawn once it becomes ready.
    pub fn show_for_connection<W: WorldRefType<E>>(
        &mut self,
        world: &W,
        world_entity: &E,
        connection_key: &ConnectionKey,
    ) -> Result<(), ServerError> {
        let entity_id = self.entity_id_or_err(world_entity)?;
        self.connection_or_err(connection_key)?;

        if !self.authority.add_observer(&entity_id, *connection_key) {
            return Ok(());
        }
        if self.is_ready(connection_key) {
            self.send_spawn(world, &entity_id, connection_key);
        } else {
            debug!(
                "Connection {:?} not ready, deferring spawn of {}",
                connection_key, entity_id
            );
        }
        Ok(())
    }

    pub fn hide_for_connection(
        &mut self,
        world_entity: &E,
        connection_key: &ConnectionKey,
    ) -> Result<(), ServerError> {
        let entity_id = self.entity_id_or_err(world_entity)?;
        let connection = self.connection_or_err(connection_key)?;
        let ready = connection.is_ready();

        if self.authority.hide(&entity_id, *connection_key) && ready {
            if let Some(connection) = self.connections.get_mut(connection_key) {
                connection.send(&ObjectHideMessage { entity: entity_id });
            }
        }
        Ok(())
    }

    // Queries

    pub fn entity_id(&self, world_entity: &E) -> Option<EntityId> {
        self.entity_map.entity_id(world_entity)
    }

    pub fn world_entity(&self, entity_id: &EntityId) -> Option<E> {
        self.entity_map.world_entity(entity_id)
    }

    pub fn is_spawned(&self, world_entity: &E) -> bool {
        self.entity_map.contains_entity(world_entity)
    }

    /// Returns None if the entity was never spawned
    pub fn entity_owner(&self, world_entity: &E) -> Option<EntityOwner> {
        let entity_id = self.entity_map.entity_id(world_entity)?;
        Some(self.authority.owner(&entity_id).into())
    }

    /// The player entity of a connection
    pub fn controlled_entity(&self, connection_key: &ConnectionKey) -> Option<E> {
        let entity_id = self.authority.player_of(connection_key)?;
        self.entity_map.world_entity(&entity_id)
    }

    pub fn observers(&self, world_entity: &E) -> Vec<ConnectionKey> {
        match self.entity_map.entity_id(world_entity) {
            Some(entity_id) => self.authority.observers(&entity_id),
            None => Vec::new(),
        }
    }

    pub fn authority_table(&self) -> &EntityAuthorityTable {
        &self.authority
    }

    // Private

    fn connection_or_err(
        &mut self,
        connection_key: &ConnectionKey,
    ) -> Result<&mut Connection, ServerError> {
        self.connections
            .get_mut(connection_key)
            .ok_or(ServerError::ConnectionNotFound {
                key: *connection_key,
            })
    }

    fn entity_id_or_err(&self, world_entity: &E) -> Result<EntityId, ServerError> {
        self.entity_map
            .entity_id(world_entity)
            .ok_or_else(|| ServerError::EntityNotSpawned {
                entity: format!("{:?}", world_entity),
            })
    }

    // New connections can see every entity not explicitly hidden from them
    fn observe_all(&mut self, connection_key: &ConnectionKey) {
        for entity_id in self.authority.entities() {
            self.authority.add_observer(&entity_id, *connection_key);
        }
    }

    fn send_observed_spawns<W: WorldRefType<E>>(
        &mut self,
        world: &W,
        connection_key: &ConnectionKey,
    ) {
        for entity_id in self.authority.observed_by(connection_key) {
            self.send_spawn(world, &entity_id, connection_key);
        }
    }

    fn send_spawn<W: WorldRefType<E>>(
        &mut self,
        world: &W,
        entity_id: &EntityId,
        connection_key: &ConnectionKey,
    ) {
        let Some(world_entity) = self.entity_map.world_entity(entity_id) else {
            return;
        };
        let Some(identity) = world.identity(&world_entity) else {
            warn!("{:?} lost its NetworkIdentity, not spawning", world_entity);
            return;
        };
        let message = SpawnMessage {
            entity: *entity_id,
            scene_id: identity.scene_id,
            asset_id: identity.asset_id,
            is_owner: self.authority.owner(entity_id) == Some(*connection_key),
            is_local_player: self.authority.player_of(connection_key) == Some(*entity_id),
            payload: world.entity_state(&world_entity),
        };
        if let Some(connection) = self.connections.get_mut(connection_key) {
            connection.send(&message);
        }
    }

    fn send_owner_change(
        &mut self,
        entity_id: &EntityId,
        connection_key: &ConnectionKey,
        is_owner: bool,
        is_local_player: bool,
    ) {
        if !self.authority.is_observer(entity_id, connection_key) {
            return;
        }
        if let Some(connection) = self.connections.get_mut(connection_key) {
            if connection.is_ready() {
                connection.send(&ChangeOwnerMessage {
                    entity: *entity_id,
                    is_owner,
                    is_local_player,
                });
            }
        }
    }
}
