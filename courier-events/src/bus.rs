//! Event Bus implementation

use crate::event::{Event, EventError, Observer};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// An observer that failed to handle a published event
#[derive(Debug)]
pub struct ObserverFailure {
    /// Name of the failing observer
    pub observer: String,
    /// What went wrong
    pub error: EventError,
}

/// Topic-keyed observer registry
///
/// Observers register for the topics they care about; publishers only talk
/// to the bus. Observer identity is the `Arc` allocation, so subscribing the
/// same observer twice to one topic is a no-op.
#[derive(Clone, Default)]
pub struct EventBus {
    observers: Arc<DashMap<String, Vec<Arc<dyn Observer>>>>,
}

impl EventBus {
    /// Create new event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer to a topic
    pub fn subscribe(&self, topic: impl Into<String>, observer: Arc<dyn Observer>) {
        let topic = topic.into();
        let mut observers = self.observers.entry(topic.clone()).or_default();

        if observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            trace!(topic = %topic, observer = observer.name(), "Observer already subscribed");
            return;
        }

        debug!(topic = %topic, observer = observer.name(), "Subscribed observer");
        observers.push(observer);
    }

    /// Unsubscribe an observer from a topic
    pub fn unsubscribe(&self, topic: &str, observer: &Arc<dyn Observer>) {
        if let Some(mut observers) = self.observers.get_mut(topic) {
            observers.retain(|o| !Arc::ptr_eq(o, observer));
            debug!(topic = %topic, observer = observer.name(), "Unsubscribed observer");
        }
    }

    /// Publish an event to every observer of its topic
    ///
    /// Observers run one after another. A failing observer is logged and
    /// reported but does not stop delivery to the rest.
    pub async fn publish(&self, event: &Event) -> Vec<ObserverFailure> {
        // Snapshot so observers can (un)subscribe while handling the event
        let observers = match self.observers.get(&event.topic) {
            Some(observers) => observers.clone(),
            None => {
                trace!(topic = %event.topic, "No observers for topic");
                return Vec::new();
            }
        };

        debug!(topic = %event.topic, id = %event.id, observers = observers.len(), "Publishing event");

        let mut failures = Vec::new();
        for observer in observers {
            if let Err(e) = observer.on_change(event).await {
                error!(observer = observer.name(), topic = %event.topic, error = %e, "Observer failed");
                failures.push(ObserverFailure {
                    observer: observer.name().to_string(),
                    error: e,
                });
            }
        }

        failures
    }

    /// Number of observers subscribed to a topic
    pub fn observer_count(&self, topic: &str) -> usize {
        self.observers.get(topic).map(|o| o.len()).unwrap_or(0)
    }

    /// Clear all observers
    pub fn clear(&self) {
        self.observers.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.observers.len())
            .finish()
    }
}
