//! Append-only activity log
//!
//! Passes write through [`EventSink::record`] and never read back. A sink
//! that cannot persist an event logs the failure instead of failing the
//! pass that produced it.

mod jsonl;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{ActivityEvent, Severity};

pub use jsonl::JsonlEventSink;

/// Default number of events returned by a query
pub const DEFAULT_EVENT_LIMIT: usize = 100;

/// Receives activity events
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Appends one event
    async fn record(&self, event: ActivityEvent);
}

/// Selects events when reading an audit log back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Only events about this host
    pub host_id: Option<Uuid>,
    /// Only events of this severity
    pub severity: Option<Severity>,
    /// Maximum number of events
    pub limit: usize,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            host_id: None,
            severity: None,
            limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

impl EventFilter {
    /// Returns `true` if `event` passes the host and severity filters
    #[must_use]
    pub fn matches(&self, event: &ActivityEvent) -> bool {
        self.host_id.is_none_or(|id| event.host_id == Some(id))
            && self.severity.is_none_or(|s| event.severity == s)
    }

    /// Keeps the newest matching events, newest first
    #[must_use]
    pub fn select(&self, events: impl DoubleEndedIterator<Item = ActivityEvent>) -> Vec<ActivityEvent> {
        events
            .rev()
            .filter(|e| self.matches(e))
            .take(self.limit)
            .collect()
    }
}

/// Keeps events in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<ActivityEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event recorded so far, oldest first
    pub async fn events(&self) -> Vec<ActivityEvent> {
        self.events.lock().await.clone()
    }

    /// Matching events, newest first
    pub async fn read_recent(&self, filter: &EventFilter) -> Vec<ActivityEvent> {
        filter.select(self.events.lock().await.iter().cloned())
    }

    /// Number of events recorded so far
    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    /// Returns `true` if nothing was recorded
    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn record(&self, event: ActivityEvent) {
        self.events.lock().await.push(event);
    }
}
