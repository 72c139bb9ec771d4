//! Scheduling capability injected into the countdown timer

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::debug;

/// A deferred tick callback
pub type Tick = Box<dyn FnOnce() + Send + 'static>;

/// Runs a callback after a delay and allows cancelling it before it fires
pub trait Scheduler: Send + Sync + 'static {
    /// Opaque token identifying one pending callback
    type Handle: Send + 'static;

    /// Schedule `tick` to run once after `delay`
    fn schedule_after(&self, delay: Duration, tick: Tick) -> Self::Handle;

    /// Cancel a pending callback. Cancelling one that already ran is a no-op.
    fn cancel(&self, handle: Self::Handle);
}

/// Scheduler backed by the tokio runtime; each tick is a sleeping task
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Bind to the runtime of the calling task
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    type Handle = JoinHandle<()>;

    fn schedule_after(&self, delay: Duration, tick: Tick) -> Self::Handle {
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            tick();
        })
    }

    fn cancel(&self, handle: Self::Handle) {
        handle.abort();
    }
}

/// Handle returned by [`ManualScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ManualHandle {
    due: Duration,
    id: u64,
}

#[derive(Default)]
struct ManualQueue {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<ManualHandle, Tick>,
}

/// Scheduler whose clock only moves when the host calls [`ManualScheduler::advance`].
///
/// Suits hosts that already own an event loop and want to pump due ticks themselves.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Arc<Mutex<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward, running every tick that falls due, in deadline order.
    ///
    /// Ticks scheduled by a running tick are picked up if they fall inside the window.
    /// Returns the number of ticks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut fired = 0;

        loop {
            let next = {
                let mut queue = self.lock();
                match queue.pending.keys().next().copied() {
                    Some(handle) if handle.due <= target => {
                        queue.now = handle.due;
                        queue.pending.remove(&handle)
                    }
                    _ => None,
                }
            };

            // Run outside the lock; ticks schedule their successors
            match next {
                Some(tick) => {
                    tick();
                    fired += 1;
                }
                None => break,
            }
        }

        self.lock().now = target;
        debug!("Manual scheduler advanced to {:?}, fired {} ticks", target, fired);
        fired
    }

    /// Number of callbacks waiting to fire
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Current value of the manual clock
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualQueue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn schedule_after(&self, delay: Duration, tick: Tick) -> Self::Handle {
        let mut queue = self.lock();
        let handle = ManualHandle {
            due: queue.now + delay,
            id: queue.next_id,
        };
        queue.next_id += 1;
        queue.pending.insert(handle, tick);
        handle
    }

    fn cancel(&self, handle: Self::Handle) {
        self.lock().pending.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Tick) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |label: &'static str| -> Tick {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().unwrap().push(label))
        };
        (log, make)
    }

    #[test]
    fn manual_runs_due_ticks_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();

        scheduler.schedule_after(Duration::from_secs(2), make("late"));
        scheduler.schedule_after(Duration::from_secs(1), make("early"));
        scheduler.schedule_after(Duration::from_secs(5), make("future"));

        assert_eq!(scheduler.advance(Duration::from_secs(2)), 2);
        assert_eq!(*log.lock().unwrap(), vec!["early", "late"]);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.now(), Duration::from_secs(2));
    }

    #[test]
    fn manual_cancel_is_noop_for_fired_or_unknown_handles() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();

        let fired = scheduler.schedule_after(Duration::from_secs(1), make("fired"));
        let cancelled = scheduler.schedule_after(Duration::from_secs(1), make("cancelled"));
        scheduler.cancel(cancelled);
        scheduler.advance(Duration::from_secs(1));

        scheduler.cancel(fired);
        scheduler.cancel(cancelled);
        assert_eq!(*log.lock().unwrap(), vec!["fired"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn manual_picks_up_ticks_scheduled_by_ticks() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        fn chain(scheduler: ManualScheduler, count: Arc<AtomicUsize>) -> Tick {
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
                let next = chain(scheduler.clone(), Arc::clone(&count));
                scheduler.schedule_after(Duration::from_secs(1), next);
            })
        }

        scheduler.schedule_after(
            Duration::from_secs(1),
            chain(scheduler.clone(), Arc::clone(&count)),
        );
        assert_eq!(scheduler.advance(Duration::from_secs(3)), 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_fires_after_delay_and_aborts() {
        let scheduler = TokioScheduler::current();
        let count = Arc::new(AtomicUsize::new(0));

        let hit = Arc::clone(&count);
        let _kept = scheduler.schedule_after(
            Duration::from_secs(1),
            Box::new(move || {
                hit.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let hit = Arc::clone(&count);
        let aborted = scheduler.schedule_after(
            Duration::from_secs(1),
            Box::new(move || {
                hit.fetch_add(10, Ordering::SeqCst);
            }),
        );
        scheduler.cancel(aborted);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
