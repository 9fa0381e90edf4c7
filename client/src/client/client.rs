use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt::Debug,
    hash::Hash,
    mem,
};

use log::{debug, info, warn};

use helm_shared::{
    AssetId, BigMapKey, ChangeOwnerMessage, Connection, ConnectionKey, EntityId, Listeners,
    MessageContainer, MessageKinds, MessageReceiver, MessageSender, NotReadyMessage,
    ObjectDestroyMessage, ObjectHideMessage, Protocol, SceneMessage, SceneOperation, SpawnMessage,
    TypedMessage, WorldMutType,
};

use crate::{events::ClientEvents, world::entity_record::ClientEntity, ClientConfig, ClientError};

/// Scene-control traffic the client received, waiting for the scene
/// coordinator to act on it
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientSceneEvent {
    ChangeScene {
        connection: ConnectionKey,
        message: SceneMessage,
    },
    NotReady {
        connection: ConnectionKey,
    },
}

/// The non-authoritative side of a session
pub struct Client<E: Copy + Eq + Hash + Debug> {
    client_config: ClientConfig,
    message_kinds: MessageKinds,
    // Connection
    connection: Option<Connection>,
    next_connection_key: u64,
    // Entities
    entities: HashMap<EntityId, ClientEntity<E>>,
    local_player: Option<EntityId>,
    prefabs: HashSet<AssetId>,
    // Events
    authenticated: Listeners<ConnectionKey>,
    scene_events: VecDeque<ClientSceneEvent>,
    incoming_events: ClientEvents<E>,
}

impl<E: Copy + Eq + Hash + Debug> Client<E> {
    /// Create a new Client
    pub fn new<P: Into<Protocol>>(client_config: ClientConfig, protocol: P) -> Self {
        let protocol: Protocol = protocol.into();

        let Protocol { message_kinds, .. } = protocol;

        Self {
            client_config,
            message_kinds,
            connection: None,
            next_connection_key: 0,
            entities: HashMap::new(),
            local_player: None,
            prefabs: HashSet::new(),
            authenticated: Listeners::new(),
            scene_events: VecDeque::new(),
            incoming_events: ClientEvents::new(),
        }
    }

    // Connection

    /// Connects to a server in another process
    pub fn connect(
        &mut self,
        sender: Box<dyn MessageSender>,
        receiver: Box<dyn MessageReceiver>,
    ) -> Result<ConnectionKey, ClientError> {
        self.connect_inner(sender, receiver, false)
    }

    /// Connects to the server running in this process
    pub fn connect_local(
        &mut self,
        sender: Box<dyn MessageSender>,
        receiver: Box<dyn MessageReceiver>,
    ) -> Result<ConnectionKey, ClientError> {
        self.connect_inner(sender, receiver, true)
    }

    fn connect_inner(
        &mut self,
        sender: Box<dyn MessageSender>,
        receiver: Box<dyn MessageReceiver>,
        local: bool,
    ) -> Result<ConnectionKey, ClientError> {
        if self.connection.is_some() {
            return Err(ClientError::AlreadyConnected);
        }

        let connection_key = ConnectionKey::from_u64(self.next_connection_key);
        self.next_connection_key += 1;

        // readiness is only ever granted by the scene handshake on this side
        let connection = if local {
            Connection::new_local(connection_key, false, sender, receiver)
        } else {
            Connection::new(connection_key, sender, receiver)
        };
        self.connection = Some(connection);

        info!("Client connected as {:?}, local: {}", connection_key, local);
        self.incoming_events.push_connection(&connection_key);
        if self.client_config.authenticate_on_connect {
            self.authenticated.invoke(&connection_key);
        }
        Ok(connection_key)
    }

    /// Drops the link and forgets every spawned entity
    pub fn disconnect(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        let connection_key = connection.key();
        self.entities.clear();
        self.local_player = None;
        self.scene_events.clear();

        info!("Client {:?} disconnected", connection_key);
        self.incoming_events.push_disconnection(&connection_key);
    }

    /// Whether the client has a live link
    pub fn is_active(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| !connection.is_closed())
    }

    /// Whether the link is to a server in this process
    pub fn is_local(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| connection.is_local())
    }

    pub fn connection_key(&self) -> Option<ConnectionKey> {
        self.connection.as_ref().map(|connection| connection.key())
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn connection_mut(&mut self) -> Option<&mut Connection> {
        self.connection.as_mut()
    }

    pub fn is_ready(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| connection.is_ready())
    }

    /// Sets the readiness flag of the link. Does not notify the server.
    pub fn set_ready(&mut self, ready: bool) {
        if let Some(connection) = self.connection.as_mut() {
            connection.set_ready(ready);
        }
    }

    // Authentication

    pub fn authenticated_listeners(&mut self) -> &mut Listeners<ConnectionKey> {
        &mut self.authenticated
    }

    /// Fires the Authenticated listeners for the current connection
    pub fn on_authenticated(&mut self) {
        if let Some(connection_key) = self.connection_key() {
            self.authenticated.invoke(&connection_key);
        }
    }

    // Messages

    pub fn send<M: TypedMessage>(&mut self, message: &M) -> Result<(), ClientError> {
        let Some(connection) = self.connection.as_mut() else {
            return Err(ClientError::NotActive {
                operation: "sending messages",
            });
        };
        connection.send(message);
        Ok(())
    }

    /// Processes everything the server sent. Entity traffic is applied to
    /// `world`, scene-control traffic is queued for `take_scene_events`, and
    /// every message is then handed to the connection's handlers.
    pub fn receive<W: WorldMutType<E>>(&mut self, world: &mut W) -> ClientEvents<E> {
        let Some(connection) = self.connection.as_mut() else {
            return mem::take(&mut self.incoming_events);
        };
        let connection_key = connection.key();
        let messages = connection.receive_messages();
        let closed = connection.is_closed();

        for message in messages {
            self.receive_message(world, &connection_key, &message);
        }

        if closed {
            self.disconnect();
        }

        mem::take(&mut self.incoming_events)
    }

    fn receive_message<W: WorldMutType<E>>(
        &mut self,
        world: &mut W,
        connection_key: &ConnectionKey,
        message: &MessageContainer,
    ) {
        if !self.message_kinds.contains(&message.kind()) {
            warn!(
                "Received unregistered message `{}`, dropping",
                message.name()
            );
            return;
        }

        if let Some(spawn) = message.downcast_ref::<SpawnMessage>() {
            self.handle_spawn(world, spawn);
        } else if let Some(destroy) = message.downcast_ref::<ObjectDestroyMessage>() {
            self.handle_despawn(world, &destroy.entity);
        } else if let Some(hide) = message.downcast_ref::<ObjectHideMessage>() {
            self.handle_despawn(world, &hide.entity);
        } else if let Some(change) = message.downcast_ref::<ChangeOwnerMessage>() {
            self.handle_owner_change(change);
        } else if let Some(scene) = message.downcast_ref::<SceneMessage>() {
            // a normal load replaces the scene, whatever survives is spawned again once ready
            if scene.operation == SceneOperation::Normal && !self.is_local() {
                self.clear_entities(world);
            }
            self.scene_events.push_back(ClientSceneEvent::ChangeScene {
                connection: *connection_key,
                message: scene.clone(),
            });
        } else if message.is::<NotReadyMessage>() {
            self.scene_events.push_back(ClientSceneEvent::NotReady {
                connection: *connection_key,
            });
        }

        if let Some(connection) = self.connection.as_mut() {
            connection.dispatch(message);
        }
    }

    /// Drains queued scene-control traffic, oldest first
    pub fn take_scene_events(&mut self) -> Vec<ClientSceneEvent> {
        self.scene_events.drain(..).collect()
    }

    pub fn has_scene_events(&self) -> bool {
        !self.scene_events.is_empty()
    }

    // Prefabs

    /// Allows spawn messages for `asset_id` to be instantiated
    pub fn register_prefab(&mut self, asset_id: AssetId) {
        if !self.prefabs.insert(asset_id) {
            debug!("Prefab {:?} was already registered", asset_id);
        }
    }

    pub fn unregister_prefab(&mut self, asset_id: &AssetId) -> bool {
        self.prefabs.remove(asset_id)
    }

    pub fn has_prefab(&self, asset_id: &AssetId) -> bool {
        self.prefabs.contains(asset_id)
    }

    // Entities

    pub fn entity(&self, entity_id: &EntityId) -> Option<&ClientEntity<E>> {
        self.entities.get(entity_id)
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        let mut output: Vec<EntityId> = self.entities.keys().copied().collect();
        output.sort();
        output
    }

    pub fn entities_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_owner(&self, entity_id: &EntityId) -> bool {
        self.entities
            .get(entity_id)
            .is_some_and(|entity| entity.is_owner)
    }

    /// The entity the server made this peer's player
    pub fn local_player(&self) -> Option<EntityId> {
        self.local_player
    }

    fn handle_spawn<W: WorldMutType<E>>(&mut self, world: &mut W, message: &SpawnMessage) {
        if let Some(record) = self.entities.get_mut(&message.entity) {
            // already known, e.g. re-sent after a readiness cycle
            record.is_owner = message.is_owner;
            record.is_local_player = message.is_local_player;
            self.update_local_player(&message.entity, message.is_local_player);
            return;
        }

        let world_entity = if self.is_local() {
            None
        } else {
            match self.instantiate(world, message) {
                Some(world_entity) => Some(world_entity),
                None => return,
            }
        };

        if let Some(world_entity) = world_entity.as_ref() {
            world.apply_entity_state(world_entity, &message.payload);
        }

        self.entities.insert(
            message.entity,
            ClientEntity {
                world_entity,
                scene_id: message.scene_id,
                asset_id: message.asset_id,
                is_owner: message.is_owner,
                is_local_player: message.is_local_player,
            },
        );
        self.update_local_player(&message.entity, message.is_local_player);
        self.incoming_events.push_spawn(message.entity, world_entity);
    }

    fn instantiate<W: WorldMutType<E>>(&self, world: &mut W, message: &SpawnMessage) -> Option<E> {
        if message.scene_id.is_scene_object() {
            let Some(world_entity) = world.find_scene_entity(&message.scene_id) else {
                warn!(
                    "Spawn of {}: no scene object with {:?} in this scene",
                    message.entity, message.scene_id
                );
                return None;
            };
            world.set_active(&world_entity, true);
            return Some(world_entity);
        }

        let Some(asset_id) = message.asset_id else {
            warn!("Spawn of {}: prefab instance without an asset id", message.entity);
            return None;
        };
        if self.client_config.require_registered_prefabs && !self.prefabs.contains(&asset_id) {
            warn!(
                "Spawn of {}: no prefab registered for {:?}",
                message.entity, asset_id
            );
            return None;
        }
        let world_entity = world.spawn_from_asset(&asset_id);
        if world_entity.is_none() {
            warn!(
                "Spawn of {}: world could not instantiate {:?}",
                message.entity, asset_id
            );
        }
        world_entity
    }

    fn handle_despawn<W: WorldMutType<E>>(&mut self, world: &mut W, entity_id: &EntityId) {
        let Some(record) = self.entities.remove(entity_id) else {
            debug!("Despawn of unknown entity {}", entity_id);
            return;
        };
        if self.local_player == Some(*entity_id) {
            self.local_player = None;
        }
        if let Some(world_entity) = record.world_entity.as_ref() {
            // scene objects belong to the scene, they are only disabled
            if record.is_scene_object() {
                world.set_active(world_entity, false);
            } else {
                world.despawn_entity(world_entity);
            }
        }
        self.incoming_events
            .push_despawn(*entity_id, record.world_entity);
    }

    /// Forgets every spawned entity, removing local copies from `world`
    pub fn clear_entities<W: WorldMutType<E>>(&mut self, world: &mut W) {
        for entity_id in self.entity_ids() {
            self.handle_despawn(world, &entity_id);
        }
    }

    fn handle_owner_change(&mut self, message: &ChangeOwnerMessage) {
        let Some(record) = self.entities.get_mut(&message.entity) else {
            debug!("Owner change for unknown entity {}", message.entity);
            return;
        };
        record.is_owner = message.is_owner;
        record.is_local_player = message.is_local_player;
        self.update_local_player(&message.entity, message.is_local_player);
        self.incoming_events
            .push_owner_change(message.entity, message.is_owner);
    }

    fn update_local_player(&mut self, entity_id: &EntityId, is_local_player: bool) {
        if is_local_player {
            if let Some(previous) = self.local_player.replace(*entity_id) {
                if previous != *entity_id {
                    if let Some(record) = self.entities.get_mut(&previous) {
                        record.is_local_player = false;
                    }
                }
            }
        } else if self.local_player == Some(*entity_id) {
            self.local_player = None;
        }
    }
}
