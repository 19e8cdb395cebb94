//! Hub error types.

use thiserror::Error;

use crate::listener::ListenerId;

/// Errors surfaced by the event hub.
#[derive(Debug, Error)]
pub enum HubError {
    /// The subscription pattern is empty or contains an empty segment.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The segment delimiter is the wildcard, whitespace or a control character.
    #[error("invalid delimiter {delimiter:?}: {reason}")]
    InvalidDelimiter {
        /// The rejected delimiter.
        delimiter: char,
        /// Why it was rejected.
        reason: String,
    },

    /// A listener was registered with an invocation budget of zero.
    #[error("listener ttl must be at least 1")]
    InvalidTtl,

    /// One or more listeners failed during a single publish.
    #[error("{} listener(s) failed during publish", .0.len())]
    ListenerInvocation(Vec<ListenerInvocationError>),

    /// The process-wide hub was already built before `init` was called.
    #[error("process-wide event hub is already initialized")]
    AlreadyInitialized,
}

/// Result type for hub operations.
pub type HubResult<T> = Result<T, HubError>;

/// How a listener invocation went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationFailure {
    /// The listener returned an error.
    #[error("{0}")]
    Failed(String),

    /// The listener panicked.
    #[error("panicked: {0}")]
    Panicked(String),
}

/// A single isolated listener failure recorded during `publish`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("listener '{listener_name}' ({pattern}) failed on '{event_name}': {failure}")]
pub struct ListenerInvocationError {
    /// Registration that failed.
    pub listener_id: ListenerId,
    /// Listener name used in logs.
    pub listener_name: String,
    /// Pattern the listener was registered under.
    pub pattern: String,
    /// Event name being published.
    pub event_name: String,
    /// What happened.
    pub failure: InvocationFailure,
}

impl ListenerInvocationError {
    /// Whether the listener panicked rather than returning an error.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self.failure, InvocationFailure::Panicked(_))
    }
}
