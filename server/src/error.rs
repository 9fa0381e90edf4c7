use thiserror::Error;

use helm_shared::{ConnectionKey, ErrorKind};

/// Errors returned by `Server` operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    #[error("SpawnObject for {entity}, server is not active. Cannot spawn objects without an active server.")]
    SpawnWhileInactive { entity: String },

    #[error("Server is not active. Call Server.listen() before {operation}")]
    NotActive { operation: &'static str },

    #[error("{entity} has no NetworkIdentity")]
    NoIdentity { entity: String },

    #[error("Player object has no NetworkIdentity")]
    PlayerHasNoIdentity { entity: String },

    #[error("Player object is not a player in the connection")]
    PlayerNotInConnection { entity: String },

    #[error("Cannot add {entity} as player, it is already owned by another connection")]
    OwnedByOtherConnection { entity: String },

    #[error("{entity} has already been spawned")]
    EntityAlreadySpawned { entity: String },

    #[error("{entity} has not been spawned by this server")]
    EntityNotSpawned { entity: String },

    #[error("{entity} has no owning connection")]
    NoOwningConnection { entity: String },

    #[error("No connection exists for key {key:?}")]
    ConnectionNotFound { key: ConnectionKey },

    #[error("A local connection has already been accepted")]
    LocalConnectionExists,

    #[error("Connection limit of {limit} reached")]
    ConnectionLimitReached { limit: usize },

    #[error("Connection {key:?} sent message `{name}` which is not registered with the Protocol")]
    UnregisteredMessage { key: ConnectionKey, name: &'static str },
}

impl ServerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServerError::ConnectionNotFound { .. } => ErrorKind::InvalidArgument,
            _ => ErrorKind::InvalidOperation,
        }
    }
}
