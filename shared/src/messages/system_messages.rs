use crate::{
    messages::{message::TypedMessage, message_kinds::MessageKind},
    world::entity::{AssetId, EntityId, SceneId},
};

/// How a scene is brought in when the server changes scene
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SceneOperation {
    /// Replaces the current scene. Every peer has to re-ready.
    #[default]
    Normal,
    /// Layers the scene on top of the current one
    LoadAdditive,
}

/// Sent by the server to tell peers which scene to load
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneMessage {
    pub scene_name: String,
    pub operation: SceneOperation,
}

impl SceneMessage {
    pub fn new(scene_name: impl Into<String>, operation: SceneOperation) -> Self {
        Self {
            scene_name: scene_name.into(),
            operation,
        }
    }
}

impl TypedMessage for SceneMessage {
    const KIND: MessageKind = MessageKind::new("helm::SceneMessage");
}

/// Sent by the server before a scene change, peers stop accepting entity traffic
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotReadyMessage;

impl TypedMessage for NotReadyMessage {
    const KIND: MessageKind = MessageKind::new("helm::NotReadyMessage");
}

/// Sent by a peer once it has finished loading and can take entity traffic
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadyMessage;

impl TypedMessage for ReadyMessage {
    const KIND: MessageKind = MessageKind::new("helm::ReadyMessage");
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnMessage {
    pub entity: EntityId,
    pub scene_id: SceneId,
    pub asset_id: Option<AssetId>,
    /// Whether the receiving peer owns the entity
    pub is_owner: bool,
    /// Whether the entity is the receiving peer's player
    pub is_local_player: bool,
    /// Opaque initial state, produced and consumed by the world
    pub payload: Vec<u8>,
}

impl TypedMessage for SpawnMessage {
    const KIND: MessageKind = MessageKind::new("helm::SpawnMessage");
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectDestroyMessage {
    pub entity: EntityId,
}

impl TypedMessage for ObjectDestroyMessage {
    const KIND: MessageKind = MessageKind::new("helm::ObjectDestroyMessage");
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectHideMessage {
    pub entity: EntityId,
}

impl TypedMessage for ObjectHideMessage {
    const KIND: MessageKind = MessageKind::new("helm::ObjectHideMessage");
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeOwnerMessage {
    pub entity: EntityId,
    pub is_owner: bool,
    pub is_local_player: bool,
}

impl TypedMessage for ChangeOwnerMessage {
    const KIND: MessageKind = MessageKind::new("helm::ChangeOwnerMessage");
}
