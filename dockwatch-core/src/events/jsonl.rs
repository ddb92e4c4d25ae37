//! Audit log stored as one JSON object per line

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{EventFilter, EventSink};
use crate::error::{StorageError, StorageResult};
use crate::models::ActivityEvent;

/// Appends events to a JSON Lines file
#[derive(Debug)]
pub struct JsonlEventSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlEventSink {
    /// Uses `path` as the log file; it is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, event: &ActivityEvent) -> StorageResult<()> {
        let mut line =
            serde_json::to_string(event).map_err(|e| StorageError::Serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Reads matching events back, newest first.
    ///
    /// Lines that do not parse are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn read_recent(&self, filter: &EventFilter) -> StorageResult<Vec<ActivityEvent>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let events: Vec<ActivityEvent> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed audit log line");
                    None
                }
            })
            .collect();
        Ok(filter.select(events.into_iter()))
    }
}

#[async_trait]
impl EventSink for JsonlEventSink {
    async fn record(&self, event: ActivityEvent) {
        tracing::debug!(
            severity = %event.severity,
            message = %event.message,
            "Activity event"
        );
        if let Err(e) = self.append(&event).await {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                message = %event.message,
                "Failed to append activity event"
            );
        }
    }
}
