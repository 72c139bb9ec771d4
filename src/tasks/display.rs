//! Terminal countdown display

use std::io::{self, Write};
use tokio::sync::watch;
use tracing::{debug, info};

/// Background task that redraws the countdown on stdout whenever it changes
pub async fn display_task(mut display: watch::Receiver<String>) {
    info!("Starting display task");

    while display.changed().await.is_ok() {
        let text = display.borrow_and_update().clone();
        let mut stdout = io::stdout().lock();
        if let Err(e) = write!(stdout, "\r{}", text).and_then(|_| stdout.flush()) {
            debug!("Failed to draw countdown: {}", e);
        }
    }

    debug!("Display channel closed");
}
