//! Error types for timer operations

use thiserror::Error;

use crate::state::TimerPhase;

/// Errors reported by [`crate::timer::Timer`] commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A duration field was outside its accepted range
    #[error("{field} must be between 0 and {max}, got {value}")]
    InvalidInput {
        field: &'static str,
        value: u32,
        max: u32,
    },
    /// The command is not defined for the current phase
    #[error("cannot {operation} while timer is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: TimerPhase,
    },
}
