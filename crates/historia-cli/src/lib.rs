//! historia-cli library root.
//!
//! Exposes the config layer and the terminal wizard so integration tests
//! can drive them without a real terminal.

pub mod config;
pub mod prompt;
pub mod wizard;
