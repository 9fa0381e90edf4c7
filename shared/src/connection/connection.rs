use log::warn;

use crate::{
    bigmap::BigMapKey,
    messages::{
        dispatcher::MessageDispatcher, message::TypedMessage, message_container::MessageContainer,
    },
    transport::{MessageReceiver, MessageSender},
};

// ConnectionKey
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct ConnectionKey(u64);

impl BigMapKey for ConnectionKey {
    fn to_u64(&self) -> u64 {
        self.0
    }

    fn from_u64(value: u64) -> Self {
        ConnectionKey(value)
    }
}

/// One link to a peer.
pub struct Connection {
    key: ConnectionKey,
    ready: bool,
    is_local: bool,
    closed: bool,
    dispatcher: MessageDispatcher,
    sender: Box<dyn MessageSender>,
    receiver: Box<dyn MessageReceiver>,
}

impl Connection {
    pub fn new(
        key: ConnectionKey,
        sender: Box<dyn MessageSender>,
        receiver: Box<dyn MessageReceiver>,
    ) -> Self {
        Self {
            key,
            ready: false,
            is_local: false,
            closed: false,
            dispatcher: MessageDispatcher::new(),
            sender,
            receiver,
        }
    }

    /// Link to a client running in the same process as the server
    pub fn new_local(
        key: ConnectionKey,
        ready: bool,
        sender: Box<dyn MessageSender>,
        receiver: Box<dyn MessageReceiver>,
    ) -> Self {
        let mut connection = Self::new(key, sender, receiver);
        connection.is_local = true;
        connection.ready = ready;
        connection
    }

    pub fn key(&self) -> ConnectionKey {
        self.key
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    /// Whether the remote end has gone away
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // Outgoing

    pub fn send<M: TypedMessage>(&mut self, message: &M) {
        self.send_container(MessageContainer::new(message.clone()));
    }

    pub fn send_container(&mut self, message: MessageContainer) {
        if let Err(error) = self.sender.send(message) {
            warn!("Connection {:?}: {}", self.key, error);
            self.closed = true;
        }
    }

    // Incoming

    /// Drains everything the remote end has sent so far.
    /// Marks the connection closed if the link went away.
    pub fn receive_messages(&mut self) -> Vec<MessageContainer> {
        let mut messages = Vec::new();
        loop {
            match self.receiver.receive() {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => break,
                Err(_) => {
                    self.closed = true;
                    break;
                }
            }
        }
        messages
    }

    /// Routes `message` to the registered handler for its kind
    pub fn dispatch(&mut self, message: &MessageContainer) -> bool {
        self.dispatcher.dispatch(self.key, message)
    }

    // Handlers

    pub fn register_handler<M: TypedMessage, F: FnMut(&M) + 'static>(&mut self, handler: F) {
        self.dispatcher.register_handler::<M, F>(handler);
    }

    pub fn register_handler_with_connection<M, F>(&mut self, handler: F)
    where
        M: TypedMessage,
        F: FnMut(ConnectionKey, &M) + 'static,
    {
        self.dispatcher
            .register_handler_with_connection::<M, F>(handler);
    }

    pub fn unregister_handler<M: TypedMessage>(&mut self) -> bool {
        self.dispatcher.unregister_handler::<M>()
    }

    pub fn has_handler<M: TypedMessage>(&self) -> bool {
        self.dispatcher.has_handler::<M>()
    }

    pub fn dispatcher(&self) -> &MessageDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut MessageDispatcher {
        &mut self.dispatcher
    }
}
