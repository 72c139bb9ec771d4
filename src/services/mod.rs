//! Completion services module
//!
//! This module contains what happens when a countdown finishes: saving a
//! timestamped record and flashing an alert.

pub mod alert;
pub mod capture;

// Re-export main functions
pub use alert::{alert_title, flash_alert};
pub use capture::{write_artifact, CompletionRecord};
