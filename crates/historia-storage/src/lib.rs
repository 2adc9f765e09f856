//! historia-storage
//!
//! Durable key-value storage for session snapshots.

pub mod error;
pub mod snapshot;
pub mod store;
