use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    connection::connection::ConnectionKey,
    messages::{
        message::TypedMessage, message_container::MessageContainer, message_kinds::MessageKind,
    },
};

type MessageHandler = Box<dyn FnMut(ConnectionKey, &MessageContainer)>;

/// Routes inbound messages to at most one handler per message kind.
#[derive(Default)]
pub struct MessageDispatcher {
    handlers: HashMap<MessageKind, MessageHandler>,
}

impl MessageDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler` for `M`, replacing any handler already registered for it
    pub fn register_handler<M: TypedMessage, F: FnMut(&M) + 'static>(&mut self, mut handler: F) {
        self.register_handler_with_connection::<M, _>(move |_, message| handler(message));
    }

    /// Installs a handler for `M` which also receives the originating connection
    pub fn register_handler_with_connection<M, F>(&mut self, mut handler: F)
    where
        M: TypedMessage,
        F: FnMut(ConnectionKey, &M) + 'static,
    {
        let handler: MessageHandler = Box::new(
            move |connection_key: ConnectionKey, container: &MessageContainer| {
                match container.downcast_ref::<M>() {
                    Some(message) => handler(connection_key, message),
                    None => warn!(
                        "Message of kind `{}` did not match the type registered for that kind",
                        container.kind()
                    ),
                }
            },
        );
        if self.handlers.insert(M::KIND, handler).is_some() {
            debug!("Replaced handler for message kind `{}`", M::KIND);
        }
    }

    /// Removes the handler for `M`. Returns whether one was registered.
    pub fn unregister_handler<M: TypedMessage>(&mut self) -> bool {
        self.handlers.remove(&M::KIND).is_some()
    }

    pub fn has_handler<M: TypedMessage>(&self) -> bool {
        self.handlers.contains_key(&M::KIND)
    }

    pub fn has_handler_for(&self, kind: &MessageKind) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Hands `container` to the handler registered for its kind.
    /// Returns `false` and drops the message if there is none.
    pub fn dispatch(&mut self, connection_key: ConnectionKey, container: &MessageContainer) -> bool {
        let Some(handler) = self.handlers.get_mut(&container.kind()) else {
            debug!(
                "No handler registered for message kind `{}`, dropping",
                container.kind()
            );
            return false;
        };
        handler(connection_key, container);
        true
    }
}
