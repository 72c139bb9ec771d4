//! Main application state management

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::{TimerPhase, TimerSnapshot};
use crate::{
    config::Config,
    error::TimerError,
    timer::{format_hms, TickSink, Timer, TokioScheduler},
};

/// Published once each time a countdown reaches zero on its own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub finished_at: DateTime<Local>,
    /// Run number of the countdown that finished
    pub run: u64,
    pub total_seconds: u64,
}

/// Completion handling options
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub capture: bool,
    pub capture_dir: PathBuf,
    pub alert: bool,
    pub flash_interval: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            capture: false,
            capture_dir: PathBuf::from("."),
            alert: true,
            flash_interval: Duration::from_millis(500),
        }
    }
}

impl From<&Config> for CompletionSettings {
    fn from(config: &Config) -> Self {
        Self {
            capture: config.capture,
            capture_dir: config.capture_dir.clone(),
            alert: !config.no_alert,
            flash_interval: config.flash_interval(),
        }
    }
}

/// Main application state that owns the countdown and its notification channels
pub struct AppState {
    /// The single countdown driven by the tokio runtime
    pub timer: Timer<TokioScheduler>,
    pub completion: CompletionSettings,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Latest `HH:MM:SS` emitted by the timer
    pub display_tx: watch::Sender<String>,
    /// Completion notifications
    pub completion_tx: broadcast::Sender<CompletionEvent>,
    /// Whether a completion alert is currently showing
    pub alert_tx: watch::Sender<bool>,
}

impl AppState {
    /// Create the application state; must be called inside a tokio runtime
    pub fn new(port: u16, host: String, completion: CompletionSettings) -> Self {
        let (display_tx, _) = watch::channel(format_hms(0));
        let (completion_tx, _) = broadcast::channel(16);
        let (alert_tx, _) = watch::channel(false);

        let events = completion_tx.clone();
        let timer = Timer::with_completion(TokioScheduler::current(), move |finished: &TimerSnapshot| {
            let event = CompletionEvent {
                finished_at: Local::now(),
                run: finished.run,
                total_seconds: finished.total_seconds,
            };
            if events.send(event).is_err() {
                warn!("Countdown completed with no completion listeners");
            }
        });

        Self {
            timer,
            completion,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            display_tx,
            completion_tx,
            alert_tx,
        }
    }

    /// Record an action for status reporting
    fn record_action(&self, action: &str) {
        *lock_or_recover(&self.last_action, "last action") = Some(action.to_string());
        *lock_or_recover(&self.last_action_time, "last action time") = Some(Utc::now());
    }

    /// Sink that publishes every tick on the display channel
    fn display_sink(&self) -> TickSink {
        let display_tx = self.display_tx.clone();
        Arc::new(move |display: &str| {
            display_tx.send_replace(display.to_string());
        })
    }

    /// Start a new countdown, dismissing any alert left from the previous one.
    ///
    /// A rejected start leaves the alert alone. A zero-length countdown has
    /// already completed when `start` returns, so its own alert is kept.
    pub fn start_countdown(
        &self,
        hours: u32,
        minutes: u32,
        seconds: u32,
    ) -> Result<TimerSnapshot, TimerError> {
        let sink = self.display_sink();
        let phase = self
            .timer
            .start(hours, minutes, seconds, move |text: &str| sink(text))?;
        if phase.is_active() {
            self.dismiss_alert();
        }
        self.record_action("start");
        Ok(self.timer.snapshot())
    }

    /// Toggle between paused and running
    pub fn toggle_pause(&self) -> TimerSnapshot {
        let phase = self.timer.pause(Some(self.display_sink()));
        self.record_action(if phase == TimerPhase::Paused { "pause" } else { "unpause" });
        self.timer.snapshot()
    }

    /// Resume a paused countdown
    pub fn resume_countdown(&self) -> TimerSnapshot {
        self.timer.resume(Some(self.display_sink()));
        self.record_action("resume");
        self.timer.snapshot()
    }

    /// Stop the countdown and reset the display
    pub fn stop_countdown(&self) -> TimerSnapshot {
        self.timer.stop();
        self.display_tx.send_replace(format_hms(0));
        self.dismiss_alert();
        self.record_action("stop");
        self.timer.snapshot()
    }

    /// Lower the completion alert; returns whether one was showing
    pub fn dismiss_alert(&self) -> bool {
        let was_showing = self.alert_tx.send_replace(false);
        if was_showing {
            info!("Completion alert dismissed");
        }
        was_showing
    }

    /// Raise the completion alert; returns whether one was already showing
    pub fn raise_alert(&self) -> bool {
        self.alert_tx.send_replace(true)
    }

    pub fn alert_active(&self) -> bool {
        *self.alert_tx.borrow()
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> TimerSnapshot {
        self.timer.snapshot()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = lock_or_recover(&self.last_action, "last action").clone();
        let last_action_time = *lock_or_recover(&self.last_action_time, "last action time");
        (last_action, last_action_time)
    }
}

/// Bookkeeping locks hold plain values, so a poisoned one is still usable
fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Recovering poisoned {} lock", what);
        poisoned.into_inner()
    })
}
