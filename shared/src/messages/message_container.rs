use std::fmt::{Debug, Formatter};

use crate::messages::{
    message::{Message, TypedMessage},
    message_kinds::MessageKind,
};

pub struct MessageContainer {
    inner: Box<dyn Message>,
}

impl MessageContainer {
    pub fn new<M: TypedMessage>(message: M) -> Self {
        Self {
            inner: Box::new(message),
        }
    }

    pub fn from_boxed(inner: Box<dyn Message>) -> Self {
        Self { inner }
    }

    pub fn kind(&self) -> MessageKind {
        self.inner.kind()
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn is<M: TypedMessage>(&self) -> bool {
        self.kind() == M::KIND
    }

    /// Returns the typed message if this container holds a message of kind `M::KIND`
    pub fn downcast_ref<M: TypedMessage>(&self) -> Option<&M> {
        if !self.is::<M>() {
            return None;
        }
        self.inner.as_any().downcast_ref::<M>()
    }

    pub fn to_boxed(self) -> Box<dyn Message> {
        self.inner
    }
}

impl Clone for MessageContainer {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
        }
    }
}

impl Debug for MessageContainer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageContainer")
            .field("kind", &self.kind())
            .finish()
    }
}
