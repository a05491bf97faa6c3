pub mod chat;
pub mod professor;
