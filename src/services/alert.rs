//! Flashing terminal alert shown when a countdown completes

use std::{
    io::{self, Write},
    time::Duration,
};
use chrono::NaiveDateTime;
use tokio::{sync::watch, time::sleep};
use tracing::{debug, info};

/// Alert title, e.g. `2024-03-09 07:05:01`
pub const ALERT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertColor {
    Red,
    Yellow,
}

impl AlertColor {
    pub fn next(self) -> Self {
        match self {
            AlertColor::Red => AlertColor::Yellow,
            AlertColor::Yellow => AlertColor::Red,
        }
    }

    fn ansi_background(self) -> &'static str {
        match self {
            AlertColor::Red => "\x1b[30;41m",
            AlertColor::Yellow => "\x1b[30;43m",
        }
    }
}

pub fn alert_title(at: NaiveDateTime) -> String {
    at.format(ALERT_TIME_FORMAT).to_string()
}

/// One frame of the alert banner
pub fn render_frame(color: AlertColor, title: &str) -> String {
    format!("\r{}  TIME'S UP  {}  \x1b[0m", color.ansi_background(), title)
}

/// Alternate the banner between red and yellow every `interval` until `active` goes false.
///
/// Returns the number of frames drawn.
pub async fn flash_alert(title: String, interval: Duration, mut active: watch::Receiver<bool>) -> usize {
    info!("Flashing completion alert: {}", title);
    let mut color = AlertColor::Red;
    let mut frames = 0;

    while *active.borrow_and_update() {
        draw(&render_frame(color, &title));
        frames += 1;

        tokio::select! {
            _ = sleep(interval) => color = color.next(),
            changed = active.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    draw("\n");
    debug!("Alert closed after {} frames", frames);
    frames
}

fn draw(frame: &str) {
    let mut stderr = io::stderr().lock();
    if let Err(e) = stderr.write_all(frame.as_bytes()).and_then(|_| stderr.flush()) {
        debug!("Failed to draw alert frame: {}", e);
    }
}
