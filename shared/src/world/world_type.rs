use crate::world::entity::{AssetId, NetworkIdentity, SceneId};

/// Structures that implement the WorldRefType trait can be read by a helm
/// Server or Client to look up networked objects
pub trait WorldRefType<E> {
    /// check whether entity exists
    fn has_entity(&self, entity: &E) -> bool;
    /// get a list of all entities in the World
    fn entities(&self) -> Vec<E>;
    /// gets the networked identity of an entity, if it has one
    fn identity(&self, entity: &E) -> Option<NetworkIdentity>;
    /// whether the entity is enabled in the scene graph
    fn is_active(&self, entity: &E) -> bool;
    /// opaque initial state sent along with a spawn
    fn entity_state(&self, _entity: &E) -> Vec<u8> {
        Vec::new()
    }

    /// finds the pre-placed object with the given scene id
    fn find_scene_entity(&self, scene_id: &SceneId) -> Option<E> {
        self.entities().into_iter().find(|entity| {
            self.identity(entity)
                .is_some_and(|identity| identity.scene_id == *scene_id)
        })
    }
}

/// Structures that implement the WorldMutType trait can be mutated by a helm
/// Server or Client
pub trait WorldMutType<E>: WorldRefType<E> {
    fn identity_mut(&mut self, entity: &E) -> Option<&mut NetworkIdentity>;
    fn set_active(&mut self, entity: &E, active: bool);
    /// instantiates a local copy of the asset, returns None if the asset is unknown
    fn spawn_from_asset(&mut self, asset_id: &AssetId) -> Option<E>;
    /// applies state received with a spawn
    fn apply_entity_state(&mut self, _entity: &E, _payload: &[u8]) {}
    fn despawn_entity(&mut self, entity: &E);
}
