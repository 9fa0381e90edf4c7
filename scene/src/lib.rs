//! # Helm Scene
//! Coordinates networked scene transitions: the server tells every peer to
//! stop taking entity traffic, broadcasts the scene to load, and re-spawns
//! entities to each peer once it reports ready again.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

mod error;
mod loader;
mod peers;
mod scene_config;
mod scene_manager;

pub use error::SceneError;
pub use loader::{ImmediateSceneLoader, LoadCompleter, LoadHandle, LoadStatus, SceneLoader};
pub use peers::Peers;
pub use scene_config::SceneConfig;
pub use scene_manager::{NetworkSceneManager, SceneChange, SceneListeners};
