pub mod chat_history;
pub mod intake;
pub mod screen;
pub mod snapshot;
pub mod summary;
