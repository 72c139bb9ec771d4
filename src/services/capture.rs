//! Timestamped completion records written to disk

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Artifact file stem, e.g. `2024_03_09__07_05_01`
pub const ARTIFACT_TIME_FORMAT: &str = "%Y_%m_%d__%H_%M_%S";

/// Contents of a completion artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub finished_at: DateTime<Local>,
    pub total_seconds: u64,
    pub duration: String,
}

/// File name for an artifact captured at `at`
pub fn artifact_name(at: NaiveDateTime) -> String {
    format!("{}.json", at.format(ARTIFACT_TIME_FORMAT))
}

/// Write `record` into `dir`, creating the directory if needed
pub async fn write_artifact(dir: &Path, record: &CompletionRecord) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create capture directory {}", dir.display()))?;

    let path = dir.join(artifact_name(record.finished_at.naive_local()));
    let body = serde_json::to_vec_pretty(record).context("Failed to serialize completion record")?;
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Completion record saved to {}", path.display());
    Ok(path)
}
