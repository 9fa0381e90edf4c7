pub mod entity;
pub mod world_type;
