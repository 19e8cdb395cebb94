//! Debug observers that print smart contract events.
//!
//! These are for development: they turn `RuntimeLog`, `ExecutionSuccess`
//! and `ExecutionFail` events into one line each on a shared sink.
//!
//! Payload values are rendered as JSON, so strings appear double-quoted:
//! `[Log] [0xabc] ["hello"]`.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::error::HubResult;
use crate::event::SmartContractEvent;
use crate::hub::{EventHub, SubscriptionHandle};
use crate::listener::{Listener, ListenerResult};

/// Writer shared between observers.
pub type SharedSink = Arc<Mutex<dyn Write + Send>>;

/// A sink writing to stdout.
#[must_use]
pub fn stdout_sink() -> SharedSink {
    Arc::new(Mutex::new(std::io::stdout()))
}

/// Which event an observer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverKind {
    /// Contract log output.
    RuntimeLog,
    /// Successful execution.
    ExecutionSuccess,
    /// Faulted execution.
    ExecutionFail,
}

impl ObserverKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 3] = [Self::RuntimeLog, Self::ExecutionSuccess, Self::ExecutionFail];

    /// Event type this kind subscribes to.
    #[must_use]
    pub fn event_type(self) -> &'static str {
        match self {
            Self::RuntimeLog => SmartContractEvent::RUNTIME_LOG,
            Self::ExecutionSuccess => SmartContractEvent::EXECUTION_SUCCESS,
            Self::ExecutionFail => SmartContractEvent::EXECUTION_FAIL,
        }
    }

    /// Render the line written for `event`.
    #[must_use]
    pub fn format_line(self, event: &SmartContractEvent) -> String {
        let payload = event.payload_display();
        match self {
            Self::RuntimeLog => format!("[Log] [{}] {payload}", event.origin_id()),
            Self::ExecutionSuccess => {
                format!("[Execution Success] [{}] {payload}", event.origin_id())
            },
            Self::ExecutionFail => {
                format!("[Execution Fail] [Error: {}] {payload}", event.origin_id())
            },
        }
    }

    fn listener_name(self) -> &'static str {
        match self {
            Self::RuntimeLog => "debug_runtime_log",
            Self::ExecutionSuccess => "debug_execution_success",
            Self::ExecutionFail => "debug_execution_fail",
        }
    }
}

/// Writes one formatted line per event and mirrors it to the log.
pub struct LogLineObserver {
    kind: ObserverKind,
    sink: SharedSink,
}

impl std::fmt::Debug for LogLineObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogLineObserver")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl LogLineObserver {
    /// Create an observer of `kind` writing to `sink`.
    #[must_use]
    pub fn new(kind: ObserverKind, sink: SharedSink) -> Self {
        Self { kind, sink }
    }

    /// The kind of event reported.
    #[must_use]
    pub fn kind(&self) -> ObserverKind {
        self.kind
    }
}

impl Listener<SmartContractEvent> for LogLineObserver {
    fn on_event(&self, event_name: &str, event: &SmartContractEvent) -> ListenerResult {
        let line = self.kind.format_line(event);
        info!(event_name = %event_name, block = event.sequence_key(), "{line}");

        let mut sink = self.sink.lock().map_err(|_| "observer sink lock poisoned")?;
        writeln!(sink, "{line}")?;
        sink.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        self.kind.listener_name()
    }
}

/// Register the three debug observers on `hub`.
///
/// # Errors
///
/// Propagates pattern errors from `subscribe`; none occur with the default
/// delimiter.
pub fn register_debug_observers(
    hub: &EventHub<SmartContractEvent>,
    sink: &SharedSink,
) -> HubResult<Vec<SubscriptionHandle>> {
    ObserverKind::ALL
        .into_iter()
        .map(|kind| {
            hub.subscribe(
                kind.event_type(),
                Arc::new(LogLineObserver::new(kind, Arc::clone(sink))),
            )
        })
        .collect()
}
