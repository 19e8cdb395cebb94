//! Helpers for publishing smart contract events.

use serde_json::Value;

use crate::event::SmartContractEvent;
use crate::global;
use crate::hub::{EventHub, PublishReport};

/// Build a [`SmartContractEvent`] and publish it on `hub` under its type.
pub fn dispatch_smart_contract_event(
    hub: &EventHub<SmartContractEvent>,
    event_type: impl Into<String>,
    payload: Vec<Value>,
    origin_id: impl Into<String>,
    sequence_key: u64,
    correlation_id: impl Into<String>,
    success: bool,
) -> PublishReport {
    let event = SmartContractEvent::new(event_type, origin_id, sequence_key, correlation_id)
        .with_payload(payload)
        .with_success(success);
    hub.publish(event.event_type(), &event)
}

/// Same as [`dispatch_smart_contract_event`] on the process-wide hub.
pub fn dispatch_domain_event(
    event_type: impl Into<String>,
    payload: Vec<Value>,
    origin_id: impl Into<String>,
    sequence_key: u64,
    correlation_id: impl Into<String>,
    success: bool,
) -> PublishReport {
    dispatch_smart_contract_event(
        global::hub(),
        event_type,
        payload,
        origin_id,
        sequence_key,
        correlation_id,
        success,
    )
}
