use thiserror::Error;

use helm_client::ClientError;
use helm_server::ServerError;
use helm_shared::ErrorKind;

/// Errors returned by `NetworkSceneManager` operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("{argument} cannot be empty or missing")]
    MissingArgument { argument: &'static str },

    #[error("Cannot change the server scene without a server")]
    NoServerRole,

    #[error("Cannot handle client scene traffic without a client")]
    NoClientRole,

    #[error("Client is not active, cannot handle scene traffic")]
    ClientNotActive,

    #[error("Local client is not active, cannot handle scene traffic in host mode")]
    LocalClientNotActive,

    #[error("A connection has already been set as ready. There can only be one.")]
    AlreadyReady,

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl SceneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SceneError::MissingArgument { .. } => ErrorKind::InvalidArgument,
            SceneError::Server(error) => error.kind(),
            SceneError::Client(error) => error.kind(),
            _ => ErrorKind::InvalidOperation,
        }
    }
}
