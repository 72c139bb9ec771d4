//! State management module
//!
//! This module contains the timer phase types and the shared application state.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, CompletionEvent, CompletionSettings};
pub use timer_state::{TimerPhase, TimerSnapshot};
