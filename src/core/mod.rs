pub mod catalog;
pub mod config;
pub mod conversation;
pub mod inference;
pub mod message;
pub mod persistence;
pub mod session;
pub mod text_wrapping;
