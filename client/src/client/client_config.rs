use std::default::Default;

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Fire the Authenticated listeners as soon as the link is up
    pub authenticate_on_connect: bool,
    /// Only instantiate spawned prefab instances whose asset was registered
    /// with `Client::register_prefab`
    pub require_registered_prefabs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            authenticate_on_connect: true,
            require_registered_prefabs: true,
        }
    }
}
