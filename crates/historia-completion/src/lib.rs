//! historia-completion
//!
//! Text-completion calls through the credential proxy, the interview and
//! summary prompts, and strict parsing of model replies.

pub mod chat;
pub mod client;
pub mod error;
pub mod interview;
pub mod retry;
pub mod summary;
