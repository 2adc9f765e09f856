//! historia-intake
//!
//! The intake workflow: form screens, navigation, the HPI interview state
//! machine, summary generation, and lab-report recognition, all driven
//! through a single [`session::IntakeSession`].

pub mod config;
pub mod error;
pub mod forms;
pub mod interview;
pub mod navigator;
pub mod recognition;
pub mod review;
pub mod session;
