//! Completion handling background task

use std::sync::Arc;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    services::{alert_title, flash_alert, write_artifact, CompletionRecord},
    state::{AppState, CompletionEvent},
    timer::format_hms,
};

/// Background task that saves a record and raises the alert for every finished countdown
pub async fn completion_task(state: Arc<AppState>, mut events: broadcast::Receiver<CompletionEvent>) {
    info!("Starting completion task");

    let mut alert: Option<JoinHandle<usize>> = None;

    loop {
        match events.recv().await {
            Ok(event) => {
                let total_seconds = event.total_seconds;
                info!(
                    "Countdown of {} finished at {}",
                    format_hms(total_seconds),
                    event.finished_at.format("%H:%M:%S")
                );

                if state.completion.capture {
                    let record = CompletionRecord {
                        finished_at: event.finished_at,
                        total_seconds,
                        duration: format_hms(total_seconds),
                    };
                    if let Err(e) = write_artifact(&state.completion.capture_dir, &record).await {
                        error!("Failed to save completion record: {:#}", e);
                    }
                }

                if !state.completion.alert {
                    continue;
                }
                if state.get_timer_state().run != event.run {
                    debug!("Countdown #{} already superseded, skipping alert", event.run);
                    continue;
                }

                state.raise_alert();
                if alert.as_ref().is_some_and(|handle| !handle.is_finished()) {
                    debug!("Alert already showing");
                    continue;
                }
                alert = Some(tokio::spawn(flash_alert(
                    alert_title(event.finished_at.naive_local()),
                    state.completion.flash_interval,
                    state.alert_tx.subscribe(),
                )));
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Completion task lagged, {} events dropped", missed);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Completion channel closed");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CompletionSettings;
    use std::time::Duration;

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not met in time");
    }

    /// The single record in `dir`, once it is completely written
    fn saved_record(dir: &std::path::Path) -> Option<CompletionRecord> {
        let mut entries = std::fs::read_dir(dir).ok()?;
        let entry = entries.next()?.ok()?;
        serde_json::from_slice(&std::fs::read(entry.path()).ok()?).ok()
    }

    #[tokio::test]
    async fn finished_countdown_saves_record_and_raises_alert() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CompletionSettings {
            capture: true,
            capture_dir: dir.path().to_path_buf(),
            alert: true,
            flash_interval: Duration::from_millis(10),
        };
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), settings));
        let events = state.completion_tx.subscribe();
        tokio::spawn(completion_task(Arc::clone(&state), events));

        state.start_countdown(0, 0, 0).unwrap();

        wait_for(|| saved_record(dir.path()).is_some()).await;
        wait_for(|| state.alert_active()).await;

        let record = saved_record(dir.path()).unwrap();
        assert_eq!(record.total_seconds, 0);
        assert_eq!(record.duration, "00:00:00");

        assert!(state.dismiss_alert());
    }

    #[tokio::test]
    async fn record_keeps_duration_when_next_countdown_starts_first() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CompletionSettings {
            capture: true,
            capture_dir: dir.path().to_path_buf(),
            alert: true,
            flash_interval: Duration::from_millis(10),
        };
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), settings));
        let mut events = state.completion_tx.subscribe();
        tokio::spawn(completion_task(Arc::clone(&state), state.completion_tx.subscribe()));

        // Both starts land before the completion task sees the first event
        state.start_countdown(0, 0, 0).unwrap();
        state.start_countdown(0, 0, 5).unwrap();
        assert_eq!(events.recv().await.unwrap().total_seconds, 0);

        wait_for(|| saved_record(dir.path()).is_some()).await;
        let record = saved_record(dir.path()).unwrap();
        assert_eq!(record.total_seconds, 0);
        assert_eq!(record.duration, "00:00:00");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!state.alert_active());
        state.stop_countdown();
    }

    #[tokio::test]
    async fn alert_can_be_disabled() {
        let settings = CompletionSettings {
            alert: false,
            ..CompletionSettings::default()
        };
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), settings));
        let mut events = state.completion_tx.subscribe();
        tokio::spawn(completion_task(Arc::clone(&state), state.completion_tx.subscribe()));

        state.start_countdown(0, 0, 0).unwrap();
        events.recv().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!state.alert_active());
    }
}
