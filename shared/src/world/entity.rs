use std::fmt::{Display, Formatter};

use crate::bigmap::BigMapKey;

/// Runtime id the server assigns to an entity when it spawns it.
/// Not stable across restarts.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct EntityId(u64);

impl BigMapKey for EntityId {
    fn to_u64(&self) -> u64 {
        self.0
    }

    fn from_u64(value: u64) -> Self {
        EntityId(value)
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable id of an entity placed in a scene ahead of time.
/// Zero marks a dynamically spawned prefab instance.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct SceneId(u64);

impl SceneId {
    pub const PREFAB: SceneId = SceneId(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_scene_object(&self) -> bool {
        self.0 != 0
    }
}

/// Identifies the asset a peer instantiates to recreate an entity
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct AssetId(u64);

impl AssetId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Marks a world object as networked.
/// Objects without one cannot be spawned, nor become a player.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub struct NetworkIdentity {
    pub scene_id: SceneId,
    pub asset_id: Option<AssetId>,
}

impl NetworkIdentity {
    /// Identity of an object placed in a scene
    pub fn scene_object(scene_id: u64) -> Self {
        Self {
            scene_id: SceneId::new(scene_id),
            asset_id: None,
        }
    }

    /// Identity of an object instantiated from `asset_id` at runtime
    pub fn prefab(asset_id: AssetId) -> Self {
        Self {
            scene_id: SceneId::PREFAB,
            asset_id: Some(asset_id),
        }
    }

    pub fn is_scene_object(&self) -> bool {
        self.scene_id.is_scene_object()
    }
}
