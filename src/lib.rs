// Courier - a shared HTTP client with per-call overrides
//
// This library re-exports the Courier crates behind a single dependency.
// The HTTP client and the TPS limiter are always available; the observer
// bus and filesystem helpers are opt-in.

// Re-export core functionality
pub use courier_http::*;

pub use courier_ratelimit;

// Re-export optional crates
#[cfg(feature = "events")]
pub use courier_events;

#[cfg(feature = "fs")]
pub use courier_fs;

// Prelude for common imports
pub mod prelude {
    pub use courier_http::prelude::*;
    pub use courier_http::TpsLimiter;

    #[cfg(feature = "events")]
    pub use courier_events::{Event, EventBus, Observer};
}
