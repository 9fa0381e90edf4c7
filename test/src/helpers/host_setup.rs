use helm_client::{Client, ClientConfig};
use helm_scene::{NetworkSceneManager, Peers, SceneConfig, SceneError, SceneLoader};
use helm_server::{Server, ServerConfig, ServerEvents};
use helm_shared::{ConnectionKey, LocalChannel, NotReadyMessage, SceneMessage, SceneOperation};

use crate::{protocol, TestEntity, TestWorld};

/// A listening server with a connected local client, sharing one world
pub struct HostSetup {
    pub server: Server<TestEntity>,
    pub client: Client<TestEntity>,
    pub manager: NetworkSceneManager,
    pub world: TestWorld,
    /// Key of the local connection on the server
    pub server_connection: ConnectionKey,
    /// Key of the link on the client
    pub client_connection: ConnectionKey,
}

impl Default for HostSetup {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSetup {
    pub fn new() -> Self {
        Self::with_manager(NetworkSceneManager::default())
    }

    pub fn with_loader<L: SceneLoader + 'static>(loader: L) -> Self {
        Self::with_manager(NetworkSceneManager::new(SceneConfig::default(), loader))
    }

    pub fn with_manager(manager: NetworkSceneManager) -> Self {
        let mut server = Server::new(ServerConfig::default(), protocol());
        server.listen();
        let mut client = Client::new(ClientConfig::default(), protocol());
        let world = TestWorld::new();

        let (server_end, client_end) = LocalChannel::pair();
        let (server_sender, server_receiver) = server_end.split();
        let server_connection = server
            .accept_local_connection(&world, server_sender, server_receiver)
            .expect("server should accept the local connection");
        let (client_sender, client_receiver) = client_end.split();
        let client_connection = client
            .connect_local(client_sender, client_receiver)
            .expect("local client should connect");

        Self {
            server,
            client,
            manager,
            world,
            server_connection,
            client_connection,
        }
    }

    pub fn change_server_scene(
        &mut self,
        scene_name: &str,
        operation: SceneOperation,
    ) -> Result<(), SceneError> {
        self.manager.change_server_scene(
            Peers::Host {
                server: &mut self.server,
                client: &mut self.client,
            },
            scene_name,
            operation,
        )
    }

    pub fn finish_load_scene(&mut self, scene_name: &str, operation: SceneOperation) {
        self.manager.finish_load_scene(
            Peers::Host {
                server: &mut self.server,
                client: &mut self.client,
            },
            &mut self.world,
            scene_name,
            operation,
        );
    }

    pub fn client_scene_message(
        &mut self,
        connection: Option<ConnectionKey>,
        message: &SceneMessage,
    ) -> Result<(), SceneError> {
        self.manager.client_scene_message(
            Peers::Host {
                server: &mut self.server,
                client: &mut self.client,
            },
            connection,
            message,
        )
    }

    pub fn client_not_ready_message(&mut self, connection: Option<ConnectionKey>) {
        self.manager.client_not_ready_message(
            Peers::Host {
                server: &mut self.server,
                client: &mut self.client,
            },
            connection,
            &NotReadyMessage,
        );
    }

    pub fn set_client_ready(&mut self) -> Result<(), SceneError> {
        self.manager.set_client_ready(Peers::Host {
            server: &mut self.server,
            client: &mut self.client,
        })
    }

    /// One pass of the host loop: server, then client, then scene coordinator
    pub fn pump(&mut self) -> ServerEvents {
        let events = self.server.receive(&self.world);
        self.client.receive(&mut self.world);
        self.manager.update(
            Peers::Host {
                server: &mut self.server,
                client: &mut self.client,
            },
            &mut self.world,
        );
        events
    }

    pub fn pump_n(&mut self, count: usize) {
        for _ in 0..count {
            self.pump();
        }
    }
}
