//! Listener trait and registration identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Boxed error a listener may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by listeners.
pub type ListenerResult = Result<(), BoxError>;

/// A callback registered against a subscription pattern.
///
/// Listeners run synchronously inside `publish`, one after another, so
/// `on_event` should return quickly. Errors and panics are isolated by the
/// hub and never stop the remaining listeners of the same emission.
pub trait Listener<P>: Send + Sync {
    /// Called once per matching emission with the published name and payload.
    ///
    /// # Errors
    ///
    /// Any error is reported by the hub as a listener invocation failure.
    fn on_event(&self, event_name: &str, payload: &P) -> ListenerResult;

    /// Optional name for debugging.
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Identifier of a single registration.
///
/// Registering the same listener twice yields two distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A named closure listener.
pub struct FnListener<F> {
    name: String,
    handler: F,
}

impl<F> FnListener<F> {
    /// Wrap `handler` under the given debug name.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<P, F> Listener<P> for FnListener<F>
where
    F: Fn(&str, &P) -> ListenerResult + Send + Sync,
{
    fn on_event(&self, event_name: &str, payload: &P) -> ListenerResult {
        (self.handler)(event_name, payload)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
