//! Event hub: subscribe, unsubscribe and synchronous publish.

use std::any::Any;
use std::fmt;
use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{HubError, HubResult, InvocationFailure, ListenerInvocationError};
use crate::listener::{FnListener, Listener, ListenerId, ListenerResult};
use crate::pattern::{DEFAULT_DELIMITER, Pattern, validate_delimiter};
use crate::registry::{Claim, ListenerEntry, ListenerRegistry};

/// Construction options for an [`EventHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubOptions {
    /// Treat `*` segments as wildcards.
    pub wildcard: bool,
    /// Segment delimiter for patterns and event names.
    pub delimiter: char,
    /// Per-pattern listener count above which a warning is logged (0 = off).
    pub max_listeners: usize,
}

impl Default for HubOptions {
    fn default() -> Self {
        Self {
            wildcard: true,
            delimiter: DEFAULT_DELIMITER,
            max_listeners: 0,
        }
    }
}

impl HubOptions {
    /// Enable or disable wildcard matching.
    #[must_use]
    pub fn with_wildcard(mut self, wildcard: bool) -> Self {
        self.wildcard = wildcard;
        self
    }

    /// Set the segment delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the per-pattern warning threshold.
    #[must_use]
    pub fn with_max_listeners(mut self, max_listeners: usize) -> Self {
        self.max_listeners = max_listeners;
        self
    }

    /// Check that these options can build a hub.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidDelimiter`] if the delimiter is `*`,
    /// whitespace or a control character.
    pub fn validate(&self) -> HubResult<()> {
        validate_delimiter(self.delimiter)
    }
}

#[cfg(feature = "config")]
impl From<&neohub_config::HubConfig> for HubOptions {
    fn from(config: &neohub_config::HubConfig) -> Self {
        Self {
            wildcard: config.wildcard,
            delimiter: config.delimiter,
            max_listeners: config.max_listeners,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: ListenerId,
    pattern: String,
}

impl SubscriptionHandle {
    /// Registration id.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Pattern the listener was registered under.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Outcome of a single `publish`.
#[derive(Debug, Default)]
pub struct PublishReport {
    invoked: usize,
    failures: Vec<ListenerInvocationError>,
}

impl PublishReport {
    /// Number of listeners invoked, including failed ones.
    #[must_use]
    pub fn invoked(&self) -> usize {
        self.invoked
    }

    /// Isolated listener failures, in invocation order.
    #[must_use]
    pub fn failures(&self) -> &[ListenerInvocationError] {
        &self.failures
    }

    /// Whether every invoked listener returned normally.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn collected failures into an aggregate error.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ListenerInvocation`] if any listener failed.
    pub fn into_result(self) -> HubResult<usize> {
        if self.failures.is_empty() {
            Ok(self.invoked)
        } else {
            Err(HubError::ListenerInvocation(self.failures))
        }
    }
}

/// In-process publish/subscribe hub.
///
/// Listeners are registered against patterns (see [`crate::pattern`]) and
/// invoked synchronously by [`publish`](Self::publish), in pattern
/// registration order and then listener registration order.
///
/// # Example
///
/// ```
/// use neohub_events::{EventHub, ListenerResult};
///
/// let hub: EventHub<String> = EventHub::new();
/// hub.subscribe_fn("SmartContract.*", "printer", |name: &str, msg: &String| -> ListenerResult {
///     println!("{name}: {msg}");
///     Ok(())
/// })
/// .unwrap();
///
/// let report = hub.publish("SmartContract.RuntimeLog", &"hello".to_string());
/// assert_eq!(report.invoked(), 1);
/// ```
pub struct EventHub<P> {
    registry: ListenerRegistry<P>,
    options: HubOptions,
}

impl<P> fmt::Debug for EventHub<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .finish()
    }
}

impl<P> Default for EventHub<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> EventHub<P> {
    /// Create a hub with wildcard matching enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::from_validated(HubOptions::default())
    }

    /// Create a hub with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidDelimiter`] if the options fail
    /// [`HubOptions::validate`].
    pub fn with_options(options: HubOptions) -> HubResult<Self> {
        options.validate()?;
        Ok(Self::from_validated(options))
    }

    pub(crate) fn from_validated(options: HubOptions) -> Self {
        Self {
            registry: ListenerRegistry::new(options.wildcard, options.max_listeners),
            options,
        }
    }

    /// Options this hub was built with.
    #[must_use]
    pub fn options(&self) -> HubOptions {
        self.options
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &ListenerRegistry<P> {
        &self.registry
    }

    fn register(
        &self,
        pattern: String,
        listener: Arc<dyn Listener<P>>,
        ttl: Option<NonZeroUsize>,
    ) -> HubResult<SubscriptionHandle> {
        let pattern = Pattern::with_delimiter(pattern, self.options.delimiter)?;
        let raw = pattern.as_str().to_owned();
        let id = self.registry.add(pattern, listener, ttl);
        Ok(SubscriptionHandle { id, pattern: raw })
    }

    /// Register a listener for every event matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidPattern`] if the pattern is empty or has an
    /// empty segment.
    pub fn subscribe(
        &self,
        pattern: impl Into<String>,
        listener: Arc<dyn Listener<P>>,
    ) -> HubResult<SubscriptionHandle> {
        self.register(pattern.into(), listener, None)
    }

    /// Register a named closure.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidPattern`] for a malformed pattern.
    pub fn subscribe_fn<F>(
        &self,
        pattern: impl Into<String>,
        name: impl Into<String>,
        handler: F,
    ) -> HubResult<SubscriptionHandle>
    where
        F: Fn(&str, &P) -> ListenerResult + Send + Sync + 'static,
    {
        self.subscribe(pattern, Arc::new(FnListener::new(name, handler)))
    }

    /// Register a listener that is removed after its first invocation.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidPattern`] for a malformed pattern.
    pub fn subscribe_once(
        &self,
        pattern: impl Into<String>,
        listener: Arc<dyn Listener<P>>,
    ) -> HubResult<SubscriptionHandle> {
        self.register(pattern.into(), listener, Some(NonZeroUsize::MIN))
    }

    /// Register a listener that is removed after `ttl` invocations.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidTtl`] if `ttl` is zero, or
    /// [`HubError::InvalidPattern`] for a malformed pattern.
    pub fn subscribe_with_ttl(
        &self,
        pattern: impl Into<String>,
        listener: Arc<dyn Listener<P>>,
        ttl: usize,
    ) -> HubResult<SubscriptionHandle> {
        let ttl = NonZeroUsize::new(ttl).ok_or(HubError::InvalidTtl)?;
        self.register(pattern.into(), listener, Some(ttl))
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let removed = self.registry.remove_id(handle.id);
        if !removed {
            trace!(
                pattern = %handle.pattern,
                listener_id = %handle.id,
                "Unsubscribe for unknown listener ignored"
            );
        }
        removed
    }

    /// Remove the first registration of `listener` under exactly `pattern`.
    pub fn remove_listener(&self, pattern: &str, listener: &Arc<dyn Listener<P>>) -> bool {
        self.registry.remove(pattern, listener)
    }

    /// Publish `payload` under `event_name` to every matching listener.
    ///
    /// Runs listeners one after another on the calling thread and returns
    /// once all of them have returned. A listener that errors or panics is
    /// logged and recorded in the report; the rest still run. Listeners
    /// registered while this call is running are not invoked by it.
    pub fn publish(&self, event_name: &str, payload: &P) -> PublishReport {
        let selected = self.registry.matching(event_name);
        let mut report = PublishReport::default();

        if selected.is_empty() {
            trace!(event_name = %event_name, "No listeners for event");
            return report;
        }

        trace!(
            event_name = %event_name,
            listener_count = selected.len(),
            "Publishing event"
        );

        for entry in selected {
            match entry.claim() {
                Claim::Spent => continue,
                Claim::Granted { last: true } => {
                    self.registry.remove_id(entry.id());
                },
                Claim::Granted { last: false } => {},
            }

            report.invoked = report.invoked.saturating_add(1);

            if let Err(failure) = invoke(&entry, event_name, payload) {
                warn!(
                    event_name = %event_name,
                    pattern = %entry.pattern(),
                    listener_name = %entry.name(),
                    listener_id = %entry.id(),
                    error = %failure,
                    "Listener failed"
                );
                report.failures.push(ListenerInvocationError {
                    listener_id: entry.id(),
                    listener_name: entry.name().to_owned(),
                    pattern: entry.pattern().as_str().to_owned(),
                    event_name: event_name.to_owned(),
                    failure,
                });
            }
        }

        debug!(
            event_name = %event_name,
            invoked = report.invoked,
            failed = report.failures.len(),
            "Event published"
        );

        report
    }

    /// Names of the listeners `publish(event_name, ..)` would invoke, in order.
    #[must_use]
    pub fn listeners(&self, event_name: &str) -> Vec<String> {
        self.registry
            .matching(event_name)
            .iter()
            .map(|e| e.name().to_owned())
            .collect()
    }

    /// Number of listeners matching `event_name`.
    #[must_use]
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.registry.matching(event_name).len()
    }

    /// Total number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Remove every registration.
    pub fn clear(&self) {
        self.registry.clear();
    }
}

fn invoke<P>(
    entry: &ListenerEntry<P>,
    event_name: &str,
    payload: &P,
) -> Result<(), InvocationFailure> {
    trace!(
        event_name = %event_name,
        listener_name = %entry.name(),
        "Notifying listener"
    );

    // Catch panics to prevent one listener from affecting others
    let result = catch_unwind(AssertUnwindSafe(|| {
        entry.listener().on_event(event_name, payload)
    }));

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(InvocationFailure::Failed(e.to_string())),
        Err(panic) => Err(InvocationFailure::Panicked(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
