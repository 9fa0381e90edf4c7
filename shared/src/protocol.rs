use crate::messages::{
    message::TypedMessage,
    message_kinds::MessageKinds,
    system_messages::{
        ChangeOwnerMessage, NotReadyMessage, ObjectDestroyMessage, ObjectHideMessage,
        ReadyMessage, SceneMessage, SpawnMessage,
    },
};

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

// Protocol
#[derive(Clone)]
pub struct Protocol {
    pub message_kinds: MessageKinds,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        let mut message_kinds = MessageKinds::new();
        message_kinds.add_message::<SceneMessage>();
        message_kinds.add_message::<NotReadyMessage>();
        message_kinds.add_message::<ReadyMessage>();
        message_kinds.add_message::<SpawnMessage>();
        message_kinds.add_message::<ObjectDestroyMessage>();
        message_kinds.add_message::<ObjectHideMessage>();
        message_kinds.add_message::<ChangeOwnerMessage>();

        Self {
            message_kinds,
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn add_message<M: TypedMessage>(&mut self) -> &mut Self {
        self.check_lock();
        self.message_kinds.add_message::<M>();
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(
        &mut self,
        plugin: P,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_add_message<M: TypedMessage>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.message_kinds.try_add_message::<M>()?;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Panics if protocol is locked
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
