//! Observable events
//!
//! Every log line carries one of these names in its `event` field.

use std::fmt;

use super::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Lister configuration loaded from disk
    ConfigLoaded,
    /// A page token was rejected for not matching the request
    PageTokenRejected,
    /// A list query was assembled
    ListQueryBuilt,
    /// A CLI command failed
    CommandFailed,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::PageTokenRejected => "PAGE_TOKEN_REJECTED",
            Event::ListQueryBuilt => "LIST_QUERY_BUILT",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded => Severity::Info,
            Event::PageTokenRejected => Severity::Warn,
            Event::ListQueryBuilt => Severity::Trace,
            Event::CommandFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
