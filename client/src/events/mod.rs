mod client_events;

pub use client_events::{
    ClientEvent, ClientEvents, ConnectEvent, DespawnEntityEvent, DisconnectEvent,
    OwnerChangeEvent, SpawnEntityEvent,
};
