pub mod chat;
pub mod completion;
