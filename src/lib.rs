//! Countdown Timer - a countdown with pause/resume and completion alerts
//!
//! The [`timer::Timer`] state machine counts down one tick per second through an
//! injected [`timer::Scheduler`]. The rest of the crate wraps it in a small
//! daemon: an HTTP control API, a terminal display, and completion handling
//! that saves timestamped records and flashes an alert.

pub mod config;
pub mod error;
pub mod timer;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::AppState;
pub use timer::{ManualScheduler, Scheduler, Timer, TokioScheduler};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
