//! # Helm Server
//! The authoritative side of a helm session: tracks connected peers, spawns
//! entities to them, grants and transfers ownership, and holds back entity
//! traffic from peers that are not ready.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use helm_shared::{
        BigMap, BigMapKey, ChannelEnd, LocalChannel, MessageReceiver, MessageSender, Protocol,
    };
}

mod error;
mod events;
mod server;
mod world;

pub use error::ServerError;
pub use events::{ConnectEvent, DisconnectEvent, ErrorEvent, ReadyEvent, ServerEvent, ServerEvents};
pub use server::{Server, ServerConfig};
pub use world::{
    authority_table::EntityAuthorityTable, entity_map::EntityMap, entity_owner::EntityOwner,
};
