pub mod chat;
pub mod mode;
