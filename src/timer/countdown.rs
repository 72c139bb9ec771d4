//! Countdown state machine driven by an injected scheduler

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};
use tracing::{debug, info};

use super::{format_hms, Scheduler};
use crate::{
    error::TimerError,
    state::{TimerPhase, TimerSnapshot},
};

/// Receives the formatted `HH:MM:SS` string once per tick
pub type TickSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Receives the one-time notification when a countdown reaches zero, along
/// with the final snapshot of that countdown
pub type CompletionSink = Arc<dyn Fn(&TimerSnapshot) + Send + Sync>;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const MAX_HOURS: u32 = 23;
const MAX_MINUTES: u32 = 59;
const MAX_SECONDS: u32 = 59;

struct Countdown<H> {
    total_seconds: u64,
    remaining: u64,
    phase: TimerPhase,
    /// Number of countdowns started on this timer
    run: u64,
    /// Bumped on every command so ticks scheduled earlier go inert
    generation: u64,
    pending: Option<H>,
    on_tick: Option<TickSink>,
}

struct Shared<S: Scheduler> {
    scheduler: S,
    on_complete: CompletionSink,
    countdown: Mutex<Countdown<S::Handle>>,
}

/// Work left to do once the state lock is released
struct Emission {
    sink: Option<TickSink>,
    display: String,
    completed: Option<TimerSnapshot>,
}

/// A single countdown with start/pause/resume/stop.
///
/// The timer never sleeps itself; every elapsed second arrives as a tick
/// through the [`Scheduler`] it was built with, and at most one tick is
/// pending at a time. Cloning yields another handle to the same countdown.
pub struct Timer<S: Scheduler> {
    inner: Arc<Shared<S>>,
}

impl<S: Scheduler> Clone for Timer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Scheduler> Timer<S> {
    /// Create an idle timer; `on_complete` fires each time a countdown expires naturally
    pub fn new<F>(scheduler: S, on_complete: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_completion(scheduler, move |_: &TimerSnapshot| on_complete())
    }

    /// Like [`Timer::new`], but the completion sink also receives the finished
    /// countdown's snapshot, taken before any later command can change it
    pub fn with_completion<F>(scheduler: S, on_complete: F) -> Self
    where
        F: Fn(&TimerSnapshot) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Shared {
                scheduler,
                on_complete: Arc::new(on_complete),
                countdown: Mutex::new(Countdown {
                    total_seconds: 0,
                    remaining: 0,
                    phase: TimerPhase::Idle,
                    run: 0,
                    generation: 0,
                    pending: None,
                    on_tick: None,
                }),
            }),
        }
    }

    /// Begin a countdown of `hours:minutes:seconds`.
    ///
    /// The starting value is emitted to `on_tick` before this returns. Fails with
    /// [`TimerError::InvalidInput`] for out-of-range fields and
    /// [`TimerError::InvalidState`] if a countdown is already running or paused.
    pub fn start<F>(
        &self,
        hours: u32,
        minutes: u32,
        seconds: u32,
        on_tick: F,
    ) -> Result<TimerPhase, TimerError>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        check_range("hours", hours, MAX_HOURS)?;
        check_range("minutes", minutes, MAX_MINUTES)?;
        check_range("seconds", seconds, MAX_SECONDS)?;

        let mut countdown = self.lock();
        if countdown.phase.is_active() {
            return Err(TimerError::InvalidState {
                operation: "start",
                phase: countdown.phase,
            });
        }

        let total_seconds =
            u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds);
        info!("Starting countdown of {}", format_hms(total_seconds));

        self.cancel_pending(&mut countdown);
        countdown.total_seconds = total_seconds;
        countdown.remaining = total_seconds;
        countdown.phase = TimerPhase::Running;
        countdown.run += 1;
        countdown.generation += 1;
        countdown.on_tick = Some(Arc::new(on_tick));

        let emission = self.emit_and_schedule(&mut countdown);
        let phase = countdown.phase;
        drop(countdown);

        self.deliver(emission);
        Ok(phase)
    }

    /// Toggle between running and paused.
    ///
    /// Pausing cancels the pending tick and keeps `remaining`; pausing again
    /// resumes, optionally with a new tick sink. A no-op when no countdown is active.
    pub fn pause(&self, on_tick: Option<TickSink>) -> TimerPhase {
        let mut countdown = self.lock();
        let current = countdown.phase;
        match current {
            TimerPhase::Running => {
                countdown.phase = TimerPhase::Paused;
                countdown.generation += 1;
                self.cancel_pending(&mut countdown);
                info!("Countdown paused at {}", format_hms(countdown.remaining));
                TimerPhase::Paused
            }
            TimerPhase::Paused => {
                let emission = self.resume_locked(&mut countdown, on_tick);
                let phase = countdown.phase;
                drop(countdown);
                self.deliver(emission);
                phase
            }
            phase => {
                debug!("Pause ignored while timer is {}", phase);
                phase
            }
        }
    }

    /// Continue a paused countdown from its current value, re-emitting it first.
    ///
    /// A provided sink replaces the one given to [`Timer::start`]. Does nothing
    /// unless the timer is paused.
    pub fn resume(&self, on_tick: Option<TickSink>) -> TimerPhase {
        let mut countdown = self.lock();
        if countdown.phase != TimerPhase::Paused {
            debug!("Resume ignored while timer is {}", countdown.phase);
            return countdown.phase;
        }

        let emission = self.resume_locked(&mut countdown, on_tick);
        let phase = countdown.phase;
        drop(countdown);
        self.deliver(emission);
        phase
    }

    /// End the countdown, zero `remaining` and cancel any pending tick. Always safe.
    pub fn stop(&self) -> TimerPhase {
        let mut countdown = self.lock();
        if countdown.phase.is_active() {
            info!("Countdown stopped at {}", format_hms(countdown.remaining));
        }
        countdown.phase = TimerPhase::Stopped;
        countdown.remaining = 0;
        countdown.generation += 1;
        self.cancel_pending(&mut countdown);
        TimerPhase::Stopped
    }

    pub fn phase(&self) -> TimerPhase {
        self.lock().phase
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        countdown_snapshot(&self.lock())
    }

    /// Whether a tick is currently scheduled
    pub fn has_pending_tick(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// One elapsed second, as delivered by the scheduler
    fn tick(&self, generation: u64) {
        let mut countdown = self.lock();
        if countdown.generation != generation || countdown.phase != TimerPhase::Running {
            debug!("Dropping stale tick from generation {}", generation);
            return;
        }

        // This tick's handle has fired
        countdown.pending = None;
        countdown.remaining = countdown.remaining.saturating_sub(1);

        let emission = self.emit_and_schedule(&mut countdown);
        drop(countdown);
        self.deliver(emission);
    }

    fn resume_locked(
        &self,
        countdown: &mut Countdown<S::Handle>,
        on_tick: Option<TickSink>,
    ) -> Emission {
        if let Some(sink) = on_tick {
            countdown.on_tick = Some(sink);
        }
        countdown.phase = TimerPhase::Running;
        countdown.generation += 1;
        info!("Countdown resumed at {}", format_hms(countdown.remaining));
        self.emit_and_schedule(countdown)
    }

    /// Render `remaining` and either schedule the next tick or finish the countdown
    fn emit_and_schedule(&self, countdown: &mut Countdown<S::Handle>) -> Emission {
        let text = format_hms(countdown.remaining);
        debug!("Tick {}", text);

        let mut completed = None;
        if countdown.remaining == 0 {
            countdown.phase = TimerPhase::Idle;
            completed = Some(countdown_snapshot(countdown));
            info!("Countdown of {} complete", format_hms(countdown.total_seconds));
        } else {
            let weak: Weak<Shared<S>> = Arc::downgrade(&self.inner);
            let generation = countdown.generation;
            let handle = self.inner.scheduler.schedule_after(
                TICK_INTERVAL,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        Timer { inner }.tick(generation);
                    }
                }),
            );
            countdown.pending = Some(handle);
        }

        Emission {
            sink: countdown.on_tick.clone(),
            display: text,
            completed,
        }
    }

    fn cancel_pending(&self, countdown: &mut Countdown<S::Handle>) {
        if let Some(handle) = countdown.pending.take() {
            self.inner.scheduler.cancel(handle);
        }
    }

    fn deliver(&self, emission: Emission) {
        if let Some(sink) = emission.sink {
            sink(&emission.display);
        }
        if let Some(finished) = emission.completed {
            (self.inner.on_complete)(&finished);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Countdown<S::Handle>> {
        // Plain data; a panicking sink never holds this lock
        self.inner
            .countdown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn countdown_snapshot<H>(countdown: &Countdown<H>) -> TimerSnapshot {
    TimerSnapshot::new(
        countdown.run,
        countdown.phase,
        countdown.total_seconds,
        countdown.remaining,
    )
}

fn check_range(field: &'static str, value: u32, max: u32) -> Result<(), TimerError> {
    if value > max {
        return Err(TimerError::InvalidInput { field, value, max });
    }
    Ok(())
}
