//! Ready-made hubs and events.

use std::sync::Once;

use neohub_events::{EventHub, SmartContractEvent};
use serde_json::json;

/// Contract hash used by [`test_contract_event`].
pub const TEST_ORIGIN: &str = "0x06fa8be9b6609d963e8fc63977b9f8dc5f10895f";
/// Block number used by [`test_contract_event`].
pub const TEST_BLOCK: u64 = 1_024;
/// Transaction hash used by [`test_contract_event`].
pub const TEST_TX: &str = "0x4a45b2c1a0e1c3f0d4d0b3a76c3d8e1b2f9e0a7c";

/// A successful event of `event_type` with a one-string payload.
#[must_use]
pub fn test_contract_event(event_type: &str) -> SmartContractEvent {
    SmartContractEvent::new(event_type, TEST_ORIGIN, TEST_BLOCK, TEST_TX)
        .with_payload(vec![json!("test payload")])
        .with_success(true)
}

/// A fresh hub for smart contract events with default options.
#[must_use]
pub fn test_hub() -> EventHub<SmartContractEvent> {
    EventHub::new()
}

static INIT_LOGGING: Once = Once::new();

/// Send `tracing` output to the test writer, honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
