/// The role a process plays in the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkRole {
    /// Authoritative server with no co-located client
    ServerOnly,
    /// Client connected to a server in another process
    RemoteClient,
    /// Server with a client running in the same process
    HostClient,
}

impl NetworkRole {
    pub fn is_server(&self) -> bool {
        matches!(self, NetworkRole::ServerOnly | NetworkRole::HostClient)
    }

    pub fn is_client(&self) -> bool {
        matches!(self, NetworkRole::RemoteClient | NetworkRole::HostClient)
    }
}
