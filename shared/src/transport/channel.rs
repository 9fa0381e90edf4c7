use smol::channel::{self, Receiver, Sender, TryRecvError};

use super::{
    error::{RecvError, SendError},
    MessageReceiver, MessageSender,
};
use crate::messages::message_container::MessageContainer;

/// In-memory transport, used for a host's local client and in tests
pub struct LocalChannel;

impl LocalChannel {
    /// A single one-way link
    pub fn unbounded() -> (Box<dyn MessageSender>, Box<dyn MessageReceiver>) {
        let (sender, receiver) = channel::unbounded();
        let receiver = ChannelReceiver::new(receiver);
        (Box::new(sender), Box::new(receiver))
    }

    /// Two connected ends of a bidirectional link.
    /// Dropping either end closes the link for the other.
    pub fn pair() -> (ChannelEnd, ChannelEnd) {
        let (a_sender, b_receiver) = Self::unbounded();
        let (b_sender, a_receiver) = Self::unbounded();
        (
            ChannelEnd {
                sender: a_sender,
                receiver: a_receiver,
            },
            ChannelEnd {
                sender: b_sender,
                receiver: b_receiver,
            },
        )
    }
}

pub struct ChannelEnd {
    pub sender: Box<dyn MessageSender>,
    pub receiver: Box<dyn MessageReceiver>,
}

impl ChannelEnd {
    pub fn split(self) -> (Box<dyn MessageSender>, Box<dyn MessageReceiver>) {
        (self.sender, self.receiver)
    }
}

impl MessageSender for Sender<MessageContainer> {
    fn send(&self, message: MessageContainer) -> Result<(), SendError> {
        let name = message.name();
        self.try_send(message)
            .map_err(|_| SendError::Closed { name })
    }
}

struct ChannelReceiver {
    receiver: Receiver<MessageContainer>,
}

impl ChannelReceiver {
    fn new(receiver: Receiver<MessageContainer>) -> Self {
        Self { receiver }
    }
}

impl MessageReceiver for ChannelReceiver {
    fn receive(&mut self) -> Result<Option<MessageContainer>, RecvError> {
        match self.receiver.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(RecvError::Closed),
        }
    }
}
