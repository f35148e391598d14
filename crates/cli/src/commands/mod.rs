//! Command handlers for the handbook CLI.

pub mod ask;
pub mod chat;
pub mod knowledge;
pub mod session;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use knowledge::KnowledgeCommand;
