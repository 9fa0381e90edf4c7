use std::{fmt::Debug, hash::Hash};

use log::{debug, info, warn};

use helm_client::{Client, ClientSceneEvent};
use helm_server::Server;
use helm_shared::{
    ConnectionKey, Listeners, NotReadyMessage, ReadyMessage, SceneMessage, SceneOperation,
    WorldMutType,
};

use crate::{
    loader::{ImmediateSceneLoader, LoadHandle, LoadStatus, SceneLoader},
    Peers, SceneConfig, SceneError,
};

/// Argument of every scene lifecycle listener
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneChange {
    pub scene_name: String,
    pub operation: SceneOperation,
}

impl SceneChange {
    pub fn new(scene_name: impl Into<String>, operation: SceneOperation) -> Self {
        Self {
            scene_name: scene_name.into(),
            operation,
        }
    }
}

/// Lifecycle listeners, each fired synchronously in registration order
#[derive(Default)]
pub struct SceneListeners {
    /// The server is about to change scene
    pub server_change_scene: Listeners<SceneChange>,
    /// The server finished loading a scene
    pub server_scene_changed: Listeners<SceneChange>,
    /// The client was told to change scene
    pub client_change_scene: Listeners<SceneChange>,
    /// The client finished loading a scene
    pub client_scene_changed: Listeners<SceneChange>,
    /// The client was told to stop taking entity traffic
    pub client_not_ready: Listeners<Option<ConnectionKey>>,
}

struct PendingLoad {
    change: SceneChange,
    handle: LoadHandle,
}

/// Sequences scene changes across a server and its peers.
///
/// A normal change on the server marks every ready peer not ready, tells all
/// peers which scene to load, and loads it locally. Peers load on their side
/// and report ready when done, at which point the server spawns entities to
/// them again. Additive changes skip the readiness cycle.
pub struct NetworkSceneManager {
    scene_config: SceneConfig,
    network_scene_name: String,
    ready: bool,
    loader: Box<dyn SceneLoader>,
    pending_loads: Vec<PendingLoad>,
    listeners: SceneListeners,
}

impl Default for NetworkSceneManager {
    fn default() -> Self {
        Self::new(SceneConfig::default(), ImmediateSceneLoader)
    }
}

impl NetworkSceneManager {
    pub fn new<L: SceneLoader + 'static>(scene_config: SceneConfig, loader: L) -> Self {
        Self {
            scene_config,
            network_scene_name: String::new(),
            ready: false,
            loader: Box::new(loader),
            pending_loads: Vec::new(),
            listeners: SceneListeners::default(),
        }
    }

    /// The scene every peer is expected to be in. Empty until the first change.
    pub fn network_scene_name(&self) -> &str {
        &self.network_scene_name
    }

    /// Whether this process's client has reported ready
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_loading(&self) -> bool {
        !self.pending_loads.is_empty()
    }

    pub fn listeners(&self) -> &SceneListeners {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut SceneListeners {
        &mut self.listeners
    }

    // Server

    /// Moves the whole session to `scene_name`
    pub fn change_server_scene<E: Copy + Eq + Hash + Debug>(
        &mut self,
        mut peers: Peers<'_, E>,
        scene_name: &str,
        operation: SceneOperation,
    ) -> Result<(), SceneError> {
        if scene_name.is_empty() {
            return Err(SceneError::MissingArgument {
                argument: "scene_name",
            });
        }
        let Some(server) = peers.server_mut() else {
            return Err(SceneError::NoServerRole);
        };

        info!("ServerChangeScene {} ({:?})", scene_name, operation);
        self.network_scene_name = scene_name.to_string();
        self.on_server_change_scene(scene_name, operation);

        if operation == SceneOperation::Normal {
            let count = server.set_all_clients_not_ready();
            debug!("Marked {} connections not ready", count);
        }
        server.send_to_all(&SceneMessage::new(scene_name, operation));

        self.begin_load(SceneChange::new(scene_name, operation));
        Ok(())
    }

    /// Runs once a scene finished loading in this process
    pub fn finish_load_scene<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
        &mut self,
        peers: Peers<'_, E>,
        world: &mut W,
        scene_name: &str,
        operation: SceneOperation,
    ) {
        debug!("FinishLoadScene {} ({:?})", scene_name, operation);
        match peers {
            Peers::Host { server, client } => {
                let client_active = client.is_active();
                if client_active {
                    client.on_authenticated();
                }
                self.finish_server_load(server, world, scene_name, operation);
                if client_active {
                    self.finish_client_load(client, scene_name, operation);
                }
            }
            Peers::ServerOnly(server) => {
                self.finish_server_load(server, world, scene_name, operation);
            }
            Peers::RemoteClient(client) => {
                client.on_authenticated();
                self.finish_client_load(client, scene_name, operation);
            }
        }
    }

    fn finish_server_load<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
        &mut self,
        server: &mut Server<E>,
        world: &mut W,
        scene_name: &str,
        operation: SceneOperation,
    ) {
        if operation == SceneOperation::Normal && self.scene_config.cleanup_unloaded_entities {
            let removed = server.cleanup_missing(&*world);
            if !removed.is_empty() {
                debug!("Despawned {} entities left behind by the previous scene", removed.len());
            }
        }
        server.spawn_objects(world);
        self.on_server_scene_changed(scene_name, operation);
    }

    fn finish_client_load<E: Copy + Eq + Hash + Debug>(
        &mut self,
        client: &mut Client<E>,
        scene_name: &str,
        operation: SceneOperation,
    ) {
        self.on_client_scene_changed(scene_name, operation);
        if self.scene_config.auto_ready && !self.ready && client.is_active() {
            if let Err(error) = self.ready_client(client) {
                warn!("Could not report ready after loading {}: {}", scene_name, error);
            }
        }
    }

    // Client

    /// Handles a scene message from the server. `connection` is the link it
    /// arrived on, which a remote client must provide.
    pub fn client_scene_message<E: Copy + Eq + Hash + Debug>(
        &mut self,
        mut peers: Peers<'_, E>,
        connection: Option<ConnectionKey>,
        message: &SceneMessage,
    ) -> Result<(), SceneError> {
        let is_host = matches!(peers, Peers::Host { .. });
        let Some(client) = peers.client_mut() else {
            return Err(SceneError::NoClientRole);
        };
        if !client.is_active() {
            return Err(if is_host {
                SceneError::LocalClientNotActive
            } else {
                SceneError::ClientNotActive
            });
        }
        let connection = connection.or_else(|| client.connection_key());
        if message.scene_name.is_empty() {
            return Err(SceneError::MissingArgument {
                argument: "scene_name",
            });
        }

        debug!(
            "ClientSceneMessage {} ({:?}) on {:?}",
            message.scene_name, message.operation, connection
        );
        self.network_scene_name = message.scene_name.clone();
        self.on_client_change_scene(&message.scene_name, message.operation);

        // the host's server load covers its client
        if !is_host {
            self.begin_load(SceneChange::new(
                message.scene_name.clone(),
                message.operation,
            ));
        }
        Ok(())
    }

    /// Handles a not-ready message from the server. Safe to repeat.
    pub fn client_not_ready_message<E: Copy + Eq + Hash + Debug>(
        &mut self,
        mut peers: Peers<'_, E>,
        connection: Option<ConnectionKey>,
        _message: &NotReadyMessage,
    ) {
        self.ready = false;
        let connection = match peers.client_mut() {
            Some(client) => {
                client.set_ready(false);
                connection.or(client.connection_key())
            }
            None => connection,
        };
        self.on_client_not_ready(connection);
    }

    /// Tells the server this process's client can take entity traffic
    pub fn set_client_ready<E: Copy + Eq + Hash + Debug>(
        &mut self,
        mut peers: Peers<'_, E>,
    ) -> Result<(), SceneError> {
        if self.ready {
            return Err(SceneError::AlreadyReady);
        }
        let is_host = matches!(peers, Peers::Host { .. });
        let Some(client) = peers.client_mut() else {
            return Err(SceneError::NoClientRole);
        };
        if !client.is_active() {
            return Err(if is_host {
                SceneError::LocalClientNotActive
            } else {
                SceneError::ClientNotActive
            });
        }
        self.ready_client(client)
    }

    fn ready_client<E: Copy + Eq + Hash + Debug>(
        &mut self,
        client: &mut Client<E>,
    ) -> Result<(), SceneError> {
        client.send(&ReadyMessage)?;
        client.set_ready(true);
        self.ready = true;
        debug!("Client reported ready");
        Ok(())
    }

    // Loop

    /// Acts on scene traffic the client received and finishes every load
    /// that completed since the last call
    pub fn update<E: Copy + Eq + Hash + Debug, W: WorldMutType<E>>(
        &mut self,
        mut peers: Peers<'_, E>,
        world: &mut W,
    ) {
        // a dropped client has to ready up again on its next connection
        if peers.client().map_or(true, |client| !client.is_active()) {
            self.ready = false;
        }

        let scene_events = match peers.client_mut() {
            Some(client) => client.take_scene_events(),
            None => Vec::new(),
        };
        for scene_event in scene_events {
            match scene_event {
                ClientSceneEvent::ChangeScene {
                    connection,
                    message,
                } => {
                    if let Err(error) =
                        self.client_scene_message(peers.reborrow(), Some(connection), &message)
                    {
                        warn!("Ignoring scene message {}: {}", message.scene_name, error);
                    }
                }
                ClientSceneEvent::NotReady { connection } => {
                    self.client_not_ready_message(
                        peers.reborrow(),
                        Some(connection),
                        &NotReadyMessage,
                    );
                }
            }
        }

        let mut completed = Vec::new();
        self.pending_loads
            .retain_mut(|pending_load| match pending_load.handle.poll() {
                LoadStatus::Pending => true,
                LoadStatus::Complete => {
                    completed.push(pending_load.change.clone());
                    false
                }
                LoadStatus::Abandoned => {
                    warn!(
                        "Load of {} was abandoned, staying not ready",
                        pending_load.change.scene_name
                    );
                    false
                }
            });

        for change in completed {
            self.finish_load_scene(
                peers.reborrow(),
                world,
                &change.scene_name,
                change.operation,
            );
        }
    }

    fn begin_load(&mut self, change: SceneChange) {
        let handle = self.loader.load(&change.scene_name, change.operation);
        self.pending_loads.push(PendingLoad { change, handle });
    }

    // Hooks

    pub fn on_server_change_scene(&mut self, scene_name: &str, operation: SceneOperation) {
        self.listeners
            .server_change_scene
            .invoke(&SceneChange::new(scene_name, operation));
    }

    pub fn on_server_scene_changed(&mut self, scene_name: &str, operation: SceneOperation) {
        self.listeners
            .server_scene_changed
            .invoke(&SceneChange::new(scene_name, operation));
    }

    pub fn on_client_change_scene(&mut self, scene_name: &str, operation: SceneOperation) {
        self.listeners
            .client_change_scene
            .invoke(&SceneChange::new(scene_name, operation));
    }

    pub fn on_client_scene_changed(&mut self, scene_name: &str, operation: SceneOperation) {
        self.listeners
            .client_scene_changed
            .invoke(&SceneChange::new(scene_name, operation));
    }

    pub fn on_client_not_ready(&mut self, connection: Option<ConnectionKey>) {
        self.listeners.client_not_ready.invoke(&connection);
    }
}
