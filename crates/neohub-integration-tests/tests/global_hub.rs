//! Process-wide hub behavior.
//!
//! Lives in its own test binary so the global starts uninitialized.

use neohub_events::global;
use neohub_events::prelude::*;
use neohub_test::prelude::*;
use serde_json::json;

#[test]
fn dispatch_domain_event_uses_the_initialized_global_hub() {
    let hub = global::init(HubOptions::default().with_max_listeners(4)).unwrap();
    assert!(global::is_initialized());
    assert_eq!(hub.options().max_listeners, 4);
    assert!(matches!(
        global::init(HubOptions::default()),
        Err(HubError::AlreadyInitialized)
    ));

    let recorder = RecordingListener::<SmartContractEvent>::shared("global");
    let handle = global::hub()
        .subscribe(SmartContractEvent::EXECUTION_SUCCESS, recorder.clone())
        .unwrap();

    let report = dispatch_domain_event(
        SmartContractEvent::EXECUTION_SUCCESS,
        vec![json!({"gas": 42})],
        "0xabc",
        77,
        "0xtx",
        true,
    );
    assert_eq!(report.invoked(), 1);

    let event = recorder.last_payload().unwrap();
    assert_eq!(event.sequence_key(), 77);
    assert_eq!(event.payload(), &[json!({"gas": 42})]);

    assert!(global::hub().unsubscribe(&handle));
    let report = dispatch_domain_event(
        SmartContractEvent::EXECUTION_SUCCESS,
        Vec::new(),
        "0xabc",
        78,
        "0xtx",
        true,
    );
    assert_eq!(report.invoked(), 0);
    assert_eq!(recorder.call_count(), 1);
}
