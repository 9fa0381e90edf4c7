pub mod entity_record;
