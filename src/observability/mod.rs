//! Observability
//!
//! Structured JSON logging for the lister and the CLI. The translator is
//! pure and never logs.
//!
//! ```ignore
//! use cel2pg::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::PageTokenRejected, &[("reason", "filter changed")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
#[cfg(test)]
pub(crate) use logger::THRESHOLD_LOCK;

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
