//! Observer support for Courier applications
//!
//! A small publish/subscribe registry: observers subscribe to string topics
//! and the bus hands every published [`Event`] to the observers of its topic.
//!
//! ## Quick Start
//!
//! ```rust
//! use courier_events::{Event, EventBus, LoggingObserver};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new();
//! bus.subscribe("order_finish", Arc::new(LoggingObserver::new("audit")));
//!
//! let failures = bus
//!     .publish(&Event::new("order_finish", serde_json::json!({"order_id": 42})))
//!     .await;
//! assert!(failures.is_empty());
//! # }
//! ```

pub mod bus;
pub mod event;

pub use bus::{EventBus, ObserverFailure};
pub use event::{Event, EventError, LoggingObserver, Observer};
