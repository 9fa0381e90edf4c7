pub mod helpers;

pub use helpers::*;
pub use test_protocol::{protocol, ChatMessage, UnregisteredMessage};
pub use test_world::{TestEntity, TestWorld};
