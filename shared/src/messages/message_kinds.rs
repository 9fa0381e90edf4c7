use std::{
    any::TypeId,
    collections::HashMap,
    fmt::{Display, Formatter},
};

use crate::messages::{error::MessageKindsError, message::TypedMessage};

/// MessageKind - declared tag identifying a message type
#[derive(Eq, Hash, Copy, Clone, PartialEq, PartialOrd, Ord, Debug)]
pub struct MessageKind {
    name: &'static str,
}

impl MessageKind {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn of<M: TypedMessage>() -> Self {
        M::KIND
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

// MessageKinds
#[derive(Clone)]
pub struct MessageKinds {
    // the type id is only kept to detect two types sharing one tag
    kind_map: HashMap<MessageKind, TypeId>,
}

impl Default for MessageKinds {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageKinds {
    pub fn new() -> Self {
        Self {
            kind_map: HashMap::new(),
        }
    }

    /// Registers `M`, panicking if another type already declared its tag
    pub fn add_message<M: TypedMessage>(&mut self) {
        if let Err(error) = self.try_add_message::<M>() {
            panic!("{}", error);
        }
    }

    pub fn try_add_message<M: TypedMessage>(&mut self) -> Result<(), MessageKindsError> {
        let type_id = TypeId::of::<M>();
        match self.kind_map.get(&M::KIND) {
            Some(existing) if *existing != type_id => Err(MessageKindsError::DuplicateKind {
                name: M::KIND.name(),
            }),
            Some(_) => Ok(()),
            None => {
                self.kind_map.insert(M::KIND, type_id);
                Ok(())
            }
        }
    }

    pub fn contains(&self, kind: &MessageKind) -> bool {
        self.kind_map.contains_key(kind)
    }

    pub fn try_check(&self, kind: &MessageKind) -> Result<(), MessageKindsError> {
        if self.contains(kind) {
            Ok(())
        } else {
            Err(MessageKindsError::MessageKindNotFound { name: kind.name() })
        }
    }

    pub fn len(&self) -> usize {
        self.kind_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kind_map.is_empty()
    }
}
