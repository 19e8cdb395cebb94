//! Neohub Test - Shared test utilities for the neohub crates.
//!
//! Mock listeners that record what they saw, listeners that fail on
//! purpose, and ready-made hubs and events.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! neohub-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use neohub_test::{CallLog, OrderProbe, test_contract_event, test_hub};
//! use neohub_events::SmartContractEvent;
//!
//! let hub = test_hub();
//! let log = CallLog::new();
//! hub.subscribe("SmartContract.*", OrderProbe::shared("a", &log)).unwrap();
//!
//! let event = test_contract_event(SmartContractEvent::RUNTIME_LOG);
//! hub.publish(event.event_type(), &event);
//! assert_eq!(log.entries(), vec!["a"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
