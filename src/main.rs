//! Countdown Timer - a countdown with pause/resume and completion alerts
//!
//! This is the main entry point for the countdown-timer daemon.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use countdown_timer::{
    api::create_router,
    config::Config,
    state::{AppState, CompletionSettings},
    tasks::{completion_task, display_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting countdown-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, capture={}, alert={}",
        config.host, config.port, config.capture, !config.no_alert
    );

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        CompletionSettings::from(&config),
    ));

    // Subscribe before anything can complete
    let events = state.completion_tx.subscribe();
    tokio::spawn(completion_task(Arc::clone(&state), events));

    if !config.quiet {
        tokio::spawn(display_task(state.display_tx.subscribe()));
    }

    if let Some(start) = config.start {
        if let Err(e) = state.start_countdown(start.hours, start.minutes, start.seconds) {
            error!("Cannot start countdown from command line: {}", e);
        }
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start         - Start a countdown {{hours, minutes, seconds}}");
    info!("  POST /pause         - Toggle pause");
    info!("  POST /resume        - Resume a paused countdown");
    info!("  POST /stop          - Stop the countdown");
    info!("  POST /alert/dismiss - Dismiss the completion alert");
    info!("  GET  /status        - Check current status");
    info!("  GET  /health        - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            result.context("Server error")?;
        }
        signal = shutdown_signal() => {
            signal.context("Failed to install signal handler")?;
            info!("Shutdown signal received");
        }
    }

    state.stop_countdown();
    info!("Server shutdown complete");
    Ok(())
}
