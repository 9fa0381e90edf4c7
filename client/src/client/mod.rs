mod client;
mod client_config;

pub use client::{Client, ClientSceneEvent};
pub use client_config::ClientConfig;
