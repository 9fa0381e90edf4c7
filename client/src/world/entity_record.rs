use helm_shared::{AssetId, SceneId};

/// What the client knows about an entity the server spawned to it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientEntity<E> {
    /// The local copy. None on a host client, which shares the server's world.
    pub world_entity: Option<E>,
    pub scene_id: SceneId,
    pub asset_id: Option<AssetId>,
    pub is_owner: bool,
    pub is_local_player: bool,
}

impl<E> ClientEntity<E> {
    pub fn is_scene_object(&self) -> bool {
        self.scene_id.is_scene_object()
    }
}
