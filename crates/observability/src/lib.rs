//! Structured logging for the warehouse programs.
//!
//! Events are written to stderr as JSON lines, filtered by `RUST_LOG`
//! (default [`DEFAULT_FILTER`]). Stdout is left to the menu and reports.

mod tracing;

pub use crate::tracing::DEFAULT_FILTER;

/// Install the JSON subscriber. Later calls keep the first subscriber.
pub fn init() {
    crate::tracing::init();
}
