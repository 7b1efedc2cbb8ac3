//! Event definitions and the observer trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// A change to something observers care about.
///
/// `topic` identifies what changed and how; `value` carries the details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Topic observers subscribe to
    pub topic: String,

    /// Change details
    pub value: serde_json::Value,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Create a new event
    pub fn new(topic: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            value,
            timestamp: Utc::now(),
        }
    }
}

/// Observer error
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Observer failed: {0}")]
    ObserverFailed(String),
}

/// Something that reacts to published events
#[async_trait]
pub trait Observer: Send + Sync {
    /// Name used in logs and failure reports
    fn name(&self) -> &str;

    /// React to an event on a subscribed topic
    async fn on_change(&self, event: &Event) -> Result<(), EventError>;
}

/// Observer that logs every event it receives
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    name: String,
}

impl LoggingObserver {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Observer for LoggingObserver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_change(&self, event: &Event) -> Result<(), EventError> {
        info!(
            observer = %self.name,
            topic = %event.topic,
            value = %event.value,
            "Observed event"
        );
        Ok(())
    }
}
