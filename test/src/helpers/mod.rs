pub mod counter;
pub mod host_setup;

pub use client_server_setup::ClientServerSetup;
pub use counter::Counter;
pub use host_setup::HostSetup;
pub use remote_peer::RemotePeer;
pub use scene_loaders::{ManualLoads, ManualSceneLoader};
