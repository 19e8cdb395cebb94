//! Mock listeners for testing.
//!
//! All mocks use `std::sync::Mutex` internally so they work from plain
//! `#[test]` functions and from inside a tokio runtime alike.

use std::sync::{Arc, Mutex};

use neohub_events::{Listener, ListenerResult};

/// Shared, ordered record of listener invocations.
///
/// Clones share the same log, so several [`OrderProbe`]s can write into one
/// `CallLog` and the test reads the combined order afterwards.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(entry.into());
        }
    }

    /// Snapshot of all entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all entries.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.clear();
        }
    }
}

/// Listener that appends its tag to a [`CallLog`] on every invocation.
#[derive(Debug, Clone)]
pub struct OrderProbe {
    tag: String,
    log: CallLog,
}

impl OrderProbe {
    /// Create a probe writing `tag` into `log`.
    #[must_use]
    pub fn new(tag: impl Into<String>, log: &CallLog) -> Self {
        Self {
            tag: tag.into(),
            log: log.clone(),
        }
    }

    /// Same as [`OrderProbe::new`], already wrapped for `subscribe`.
    #[must_use]
    pub fn shared(tag: impl Into<String>, log: &CallLog) -> Arc<Self> {
        Arc::new(Self::new(tag, log))
    }

    /// The tag written on each invocation.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl<P> Listener<P> for OrderProbe {
    fn on_event(&self, _event_name: &str, _payload: &P) -> ListenerResult {
        self.log.push(self.tag.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.tag
    }
}

/// Listener that keeps every `(event_name, payload)` it receives.
#[derive(Debug)]
pub struct RecordingListener<P> {
    name: String,
    received: Mutex<Vec<(String, P)>>,
}

impl<P: Clone> RecordingListener<P> {
    /// Create a recorder with the given debug name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Same as [`RecordingListener::new`], already wrapped for `subscribe`.
    #[must_use]
    pub fn shared(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    /// Everything received so far, in order.
    #[must_use]
    pub fn received(&self) -> Vec<(String, P)> {
        self.received
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Event names received so far, in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.received()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// Number of invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.received.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// The most recent payload, if any.
    #[must_use]
    pub fn last_payload(&self) -> Option<P> {
        self.received
            .lock()
            .ok()
            .and_then(|guard| guard.last().map(|(_, payload)| payload.clone()))
    }
}

impl<P: Clone + Send + Sync> Listener<P> for RecordingListener<P> {
    fn on_event(&self, event_name: &str, payload: &P) -> ListenerResult {
        if let Ok(mut guard) = self.received.lock() {
            guard.push((event_name.to_owned(), payload.clone()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Listener that always returns an error.
#[derive(Debug, Clone)]
pub struct FailingListener {
    message: String,
    log: Option<CallLog>,
}

impl FailingListener {
    /// Fail with `message` on every invocation.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            log: None,
        }
    }

    /// Also record the message into `log` before failing.
    #[must_use]
    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Wrap for `subscribe`.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl<P> Listener<P> for FailingListener {
    fn on_event(&self, _event_name: &str, _payload: &P) -> ListenerResult {
        if let Some(log) = &self.log {
            log.push(self.message.clone());
        }
        Err(self.message.clone().into())
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "failing"
    }
}

/// Listener that panics on every invocation.
#[derive(Debug, Clone)]
pub struct PanickingListener {
    message: String,
}

impl PanickingListener {
    /// Panic with `message` on every invocation.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wrap for `subscribe`.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl<P> Listener<P> for PanickingListener {
    fn on_event(&self, _event_name: &str, _payload: &P) -> ListenerResult {
        panic!("{}", self.message);
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "panicking"
    }
}
