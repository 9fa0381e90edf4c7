pub mod channel;
pub mod error;

use crate::messages::message_container::MessageContainer;
use error::{RecvError, SendError};

/// Used to send messages to the remote end of a link
pub trait MessageSender {
    /// Queues a message for delivery. Order is preserved per link.
    fn send(&self, message: MessageContainer) -> Result<(), SendError>;
}

/// Used to receive messages from the remote end of a link
pub trait MessageReceiver {
    /// Returns the next queued message, if any.
    /// Fails once the remote end has gone away and the queue is drained.
    fn receive(&mut self) -> Result<Option<MessageContainer>, RecvError>;
}
