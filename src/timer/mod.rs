//! Countdown timer core
//!
//! The [`Timer`] state machine plus the [`Scheduler`] capability that feeds it
//! one tick per elapsed second.

pub mod countdown;
pub mod format;
pub mod scheduler;

// Re-export main types
pub use countdown::{CompletionSink, TickSink, Timer};
pub use format::{format_hms, parse_hms};
pub use scheduler::{ManualHandle, ManualScheduler, Scheduler, Tick, TokioScheduler};
