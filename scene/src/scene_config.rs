use std::default::Default;

/// Contains Config properties which will be used by a NetworkSceneManager
#[derive(Clone, Debug)]
pub struct SceneConfig {
    /// Report ready to the server as soon as a scene finishes loading on
    /// the client
    pub auto_ready: bool,
    /// After a normal scene load, despawn every entity whose world object
    /// went away with the previous scene
    pub cleanup_unloaded_entities: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            auto_ready: true,
            cleanup_unloaded_entities: true,
        }
    }
}
