use std::{fmt::Debug, hash::Hash};

use helm_client::Client;
use helm_server::Server;
use helm_shared::NetworkRole;

/// The peers a process runs, handed to the scene coordinator on each call
pub enum Peers<'a, E: Copy + Eq + Hash + Debug> {
    ServerOnly(&'a mut Server<E>),
    RemoteClient(&'a mut Client<E>),
    Host {
        server: &'a mut Server<E>,
        client: &'a mut Client<E>,
    },
}

impl<'a, E: Copy + Eq + Hash + Debug> Peers<'a, E> {
    pub fn role(&self) -> NetworkRole {
        match self {
            Peers::ServerOnly(_) => NetworkRole::ServerOnly,
            Peers::RemoteClient(_) => NetworkRole::RemoteClient,
            Peers::Host { .. } => NetworkRole::HostClient,
        }
    }

    pub fn server(&self) -> Option<&Server<E>> {
        match self {
            Peers::ServerOnly(server) | Peers::Host { server, .. } => Some(&**server),
            Peers::RemoteClient(_) => None,
        }
    }

    pub fn server_mut(&mut self) -> Option<&mut Server<E>> {
        match self {
            Peers::ServerOnly(server) | Peers::Host { server, .. } => Some(&mut **server),
            Peers::RemoteClient(_) => None,
        }
    }

    pub fn client(&self) -> Option<&Client<E>> {
        match self {
            Peers::RemoteClient(client) | Peers::Host { client, .. } => Some(&**client),
            Peers::ServerOnly(_) => None,
        }
    }

    pub fn client_mut(&mut self) -> Option<&mut Client<E>> {
        match self {
            Peers::RemoteClient(client) | Peers::Host { client, .. } => Some(&mut **client),
            Peers::ServerOnly(_) => None,
        }
    }

    /// Borrows the same peers for a shorter lifetime
    pub fn reborrow(&mut self) -> Peers<'_, E> {
        match self {
            Peers::ServerOnly(server) => Peers::ServerOnly(&mut **server),
            Peers::RemoteClient(client) => Peers::RemoteClient(&mut **client),
            Peers::Host { server, client } => Peers::Host {
                server: &mut **server,
                client: &mut **client,
            },
        }
    }
}
