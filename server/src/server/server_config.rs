use std::default::Default;

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Whether the connection to a client running in the same process starts
    /// out ready to receive entity traffic.
    pub local_connection_ready: bool,
    /// Maximum number of simultaneous connections, `None` for no limit
    pub max_connections: Option<usize>,
    /// Drop inbound messages whose kind was never registered with the
    /// Protocol, instead of handing them to connection handlers
    pub reject_unregistered_messages: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            local_connection_ready: true,
            max_connections: None,
            reject_unregistered_messages: true,
        }
    }
}
