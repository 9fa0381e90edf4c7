use thiserror::Error;

use helm_shared::ErrorKind;

/// Errors returned by `Client` operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Client is not connected. Call Client.connect() before {operation}")]
    NotActive { operation: &'static str },

    #[error("Client is already connected, disconnect first")]
    AlreadyConnected,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidOperation
    }
}
