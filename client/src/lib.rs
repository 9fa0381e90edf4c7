//! # Helm Client
//! Connects to a helm Server, mirrors the entities it spawns, tracks which of
//! them this peer owns, and queues scene-control messages for the scene
//! coordinator.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use helm_shared::{
        BigMapKey, ChannelEnd, LocalChannel, MessageReceiver, MessageSender, Protocol,
    };
}

mod client;
mod error;
mod events;
mod world;

pub use client::{Client, ClientConfig, ClientSceneEvent};
pub use error::ClientError;
pub use events::{
    ClientEvent, ClientEvents, ConnectEvent, DespawnEntityEvent, DisconnectEvent,
    OwnerChangeEvent, SpawnEntityEvent,
};
pub use world::entity_record::ClientEntity;
