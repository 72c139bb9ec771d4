//! Timer phase and snapshot structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timer::format_hms;

/// Lifecycle phase of a countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Stopped,
}

impl TimerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Stopped => "stopped",
        }
    }

    /// Check if a countdown is in progress (running or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, TimerPhase::Running | TimerPhase::Paused)
    }
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a timer, as reported by status queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Which countdown this is; bumped by every accepted start
    pub run: u64,
    pub phase: TimerPhase,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub display: String,
}

impl TimerSnapshot {
    pub fn new(run: u64, phase: TimerPhase, total_seconds: u64, remaining_seconds: u64) -> Self {
        Self {
            run,
            phase,
            total_seconds,
            remaining_seconds,
            display: format_hms(remaining_seconds),
        }
    }

    /// Snapshot of a timer that has never been started
    pub fn idle() -> Self {
        Self::new(0, TimerPhase::Idle, 0, 0)
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
