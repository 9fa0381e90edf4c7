pub mod dispatcher;
pub mod error;
pub mod message;
pub mod message_container;
pub mod message_kinds;
pub mod system_messages;
