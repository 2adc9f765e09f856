//! historia-core
//!
//! Pure domain types, the intake field schema, and storage key conventions.
//! No I/O.

pub mod error;
pub mod keys;
pub mod models;
pub mod schema;
