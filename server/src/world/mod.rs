pub mod authority_table;
pub mod entity_map;
pub mod entity_owner;
