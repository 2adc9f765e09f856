//! historia-export
//!
//! Clinical summary reports as PDF and DOCX. Pure functions of the intake
//! state and the generated summary; no network access.

pub mod docx;
pub mod error;
pub mod pdf;
pub mod render;
pub mod report;
pub mod styles;
