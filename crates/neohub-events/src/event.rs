//! Smart contract event payload.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One smart contract event occurrence, handed to listeners unchanged.
///
/// Immutable once built: fields are only readable through getters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartContractEvent {
    event_id: Uuid,
    timestamp: DateTime<Utc>,
    event_type: String,
    origin_id: String,
    sequence_key: u64,
    correlation_id: String,
    payload: Vec<Value>,
    success: bool,
}

impl SmartContractEvent {
    /// `Runtime.Notify` from a contract; payload is the notified values.
    pub const RUNTIME_NOTIFY: &'static str = "SmartContract.RuntimeNotify";
    /// `Runtime.Log` from a contract; payload is the logged message.
    pub const RUNTIME_LOG: &'static str = "SmartContract.RuntimeLog";
    /// A contract invocation started.
    pub const EXECUTION_INVOKE: &'static str = "SmartContract.ExecutionInvoke";
    /// A contract invocation completed.
    pub const EXECUTION_SUCCESS: &'static str = "SmartContract.ExecutionSuccess";
    /// A contract invocation faulted.
    pub const EXECUTION_FAIL: &'static str = "SmartContract.ExecutionFail";

    /// All well-known event types.
    pub const ALL_TYPES: [&'static str; 5] = [
        Self::RUNTIME_NOTIFY,
        Self::RUNTIME_LOG,
        Self::EXECUTION_INVOKE,
        Self::EXECUTION_SUCCESS,
        Self::EXECUTION_FAIL,
    ];

    /// Create an event with an empty payload and `success = false`.
    #[must_use]
    pub fn new(
        event_type: impl Into<String>,
        origin_id: impl Into<String>,
        sequence_key: u64,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type: event_type.into(),
            origin_id: origin_id.into(),
            sequence_key,
            correlation_id: correlation_id.into(),
            payload: Vec::new(),
            success: false,
        }
    }

    /// Set the payload values.
    #[must_use]
    pub fn with_payload(mut self, payload: Vec<Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Set the success flag.
    #[must_use]
    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Unique id of this occurrence.
    #[must_use]
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// When the event was built.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Event type, e.g. [`Self::RUNTIME_LOG`].
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Contract hash of the emitting contract.
    #[must_use]
    pub fn origin_id(&self) -> &str {
        &self.origin_id
    }

    /// Block height the event belongs to.
    #[must_use]
    pub fn sequence_key(&self) -> u64 {
        self.sequence_key
    }

    /// Transaction hash that caused the event.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Payload values; their schema depends on the event type.
    #[must_use]
    pub fn payload(&self) -> &[Value] {
        &self.payload
    }

    /// Whether the originating execution succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Payload rendered as `[a, b, c]`.
    #[must_use]
    pub fn payload_display(&self) -> String {
        let items: Vec<String> = self.payload.iter().map(Value::to_string).collect();
        format!("[{}]", items.join(", "))
    }
}

impl fmt::Display for SmartContractEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SmartContractEvent(event_type={}, event_payload={}, contract_hash={}, \
             block_number={}, tx_hash={}, execution_success={})",
            self.event_type,
            self.payload_display(),
            self.origin_id,
            self.sequence_key,
            self.correlation_id,
            self.success
        )
    }
}
