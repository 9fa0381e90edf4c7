use helm_shared::ConnectionKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityOwner {
    Server,
    Client(ConnectionKey),
}

impl EntityOwner {
    pub fn is_server(&self) -> bool {
        matches!(self, EntityOwner::Server)
    }

    pub fn connection(&self) -> Option<ConnectionKey> {
        match self {
            EntityOwner::Server => None,
            EntityOwner::Client(connection_key) => Some(*connection_key),
        }
    }
}

impl From<Option<ConnectionKey>> for EntityOwner {
    fn from(owner: Option<ConnectionKey>) -> Self {
        match owner {
            Some(connection_key) => EntityOwner::Client(connection_key),
            None => EntityOwner::Server,
        }
    }
}
