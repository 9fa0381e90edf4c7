//! # Helm Shared
//! Common functionality shared between helm-server, helm-client & helm-scene crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bigmap;
mod connection;
mod error;
mod events;
mod messages;
mod protocol;
mod transport;
mod types;
mod world;

pub use bigmap::{BigMap, BigMapKey};
pub use connection::connection::{Connection, ConnectionKey};
pub use error::ErrorKind;
pub use events::listeners::{ListenerKey, Listeners};
pub use messages::{
    dispatcher::MessageDispatcher,
    error::MessageKindsError,
    message::{Message, TypedMessage},
    message_container::MessageContainer,
    message_kinds::{MessageKind, MessageKinds},
    system_messages::{
        ChangeOwnerMessage, NotReadyMessage, ObjectDestroyMessage, ObjectHideMessage,
        ReadyMessage, SceneMessage, SceneOperation, SpawnMessage,
    },
};
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use transport::{
    channel::{ChannelEnd, LocalChannel},
    error::{RecvError, SendError},
    MessageReceiver, MessageSender,
};
pub use types::NetworkRole;
pub use world::{
    entity::{AssetId, EntityId, NetworkIdentity, SceneId},
    world_type::{WorldMutType, WorldRefType},
};
