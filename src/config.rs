//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::timer::parse_hms;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown-timer")]
#[command(about = "A countdown timer with pause/resume, completion alerts and an HTTP control API")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Start a countdown immediately, given as H:M:S (e.g. 0:25:00)
    #[arg(short, long, value_parser = parse_start)]
    pub start: Option<StartTime>,

    /// Save a timestamped record of each completed countdown
    #[arg(short, long)]
    pub capture: bool,

    /// Directory completion records are written to
    #[arg(long, default_value = ".")]
    pub capture_dir: PathBuf,

    /// Do not flash an alert when a countdown completes
    #[arg(long)]
    pub no_alert: bool,

    /// Alert flash interval in milliseconds
    #[arg(long, default_value = "500")]
    pub flash_interval_ms: u64,

    /// Do not print the countdown to the terminal
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Countdown fields given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

fn parse_start(input: &str) -> Result<StartTime, String> {
    let total = parse_hms(input).ok_or_else(|| format!("expected H:M:S, got '{}'", input))?;
    let hours = u32::try_from(total / 3600).map_err(|e| e.to_string())?;
    Ok(StartTime {
        hours,
        minutes: ((total % 3600) / 60) as u32,
        seconds: (total % 60) as u32,
    })
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn flash_interval(&self) -> Duration {
        Duration::from_millis(self.flash_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let config = Config::try_parse_from(["countdown-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.start, None);
        assert!(!config.capture);
        assert_eq!(config.flash_interval(), Duration::from_millis(500));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn parses_start_time() {
        let config =
            Config::try_parse_from(["countdown-timer", "--start", "1:05:30", "-v"]).unwrap();
        assert_eq!(
            config.start,
            Some(StartTime { hours: 1, minutes: 5, seconds: 30 })
        );
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn rejects_malformed_start_time() {
        assert!(Config::try_parse_from(["countdown-timer", "--start", "25"]).is_err());
        assert!(Config::try_parse_from(["countdown-timer", "--start", "0:61:00"]).is_err());
    }
}
