use thiserror::Error;

/// Errors that can occur during message kind operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageKindsError {
    /// Two distinct message types declared the same kind tag
    #[error("Message kind `{name}` is already registered to a different message type. Each message type must declare a unique kind tag")]
    DuplicateKind {
        name: &'static str,
    },

    /// Message kind not found in registry
    #[error("Message kind `{name}` not found in registry. Message type must be registered with Protocol via add_message()")]
    MessageKindNotFound {
        name: &'static str,
    },
}
