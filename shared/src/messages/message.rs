use std::any::Any;

use crate::messages::message_kinds::MessageKind;

/// Object-safe view of a message travelling through a `Connection`.
///
/// Implemented for every `TypedMessage`; user code should not need to
/// implement this directly.
pub trait Message: Send + Sync + 'static {
    /// Gets the kind tag of this message
    fn kind(&self) -> MessageKind;
    /// Gets the declared name of this message
    fn name(&self) -> &'static str {
        self.kind().name()
    }
    fn clone_box(&self) -> Box<dyn Message>;
    fn as_any(&self) -> &dyn Any;
}

/// A message type with a statically declared kind tag.
///
/// Dispatch is keyed on `KIND`, never on runtime type information, so the tag
/// must be unique across a `Protocol`.
pub trait TypedMessage: Clone + Send + Sync + 'static {
    const KIND: MessageKind;
}

impl<M: TypedMessage> Message for M {
    fn kind(&self) -> MessageKind {
        M::KIND
    }

    fn clone_box(&self) -> Box<dyn Message> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
