//! Neohub Events - In-process event hub for smart contract events.
//!
//! This crate provides:
//! - Pattern matching for dot-delimited event names with `*` wildcards
//! - An ordered listener registry
//! - A synchronous publish/subscribe [`EventHub`]
//! - The [`SmartContractEvent`] payload and dispatch helpers
//! - Debug observers and an async channel bridge
//!
//! # Architecture
//!
//! Listeners are registered on an `EventHub` against a pattern. Publishing
//! an event name snapshots every listener whose pattern matches, in the
//! order the patterns (then the listeners) were first registered, and
//! invokes them on the calling thread. A failing or panicking listener is
//! logged and reported without stopping the others.
//!
//! Hubs are plain values: build one at startup and hand it to publishers
//! and subscribers. [`global::hub`] exists for code that cannot be wired
//! that way.
//!
//! # Example
//!
//! ```rust
//! use neohub_events::{EventHub, ListenerResult, SmartContractEvent};
//! use serde_json::json;
//!
//! let hub = EventHub::<SmartContractEvent>::new();
//!
//! hub.subscribe_fn("SmartContract.*", "audit", |name: &str, event: &SmartContractEvent| -> ListenerResult {
//!     println!("{name} from {}", event.origin_id());
//!     Ok(())
//! })
//! .unwrap();
//!
//! let event = SmartContractEvent::new(SmartContractEvent::RUNTIME_LOG, "0xabc", 10, "0xtx")
//!     .with_payload(vec![json!("hello")]);
//! let report = hub.publish(event.event_type(), &event);
//! assert_eq!(report.invoked(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod global;
pub mod observers;
pub mod pattern;

#[cfg(feature = "runtime")]
mod bridge;
mod dispatch;
mod error;
mod event;
mod hub;
mod listener;
mod registry;

#[cfg(feature = "runtime")]
pub use bridge::{ChannelBridge, Delivery, EventReceiver};
pub use dispatch::{dispatch_domain_event, dispatch_smart_contract_event};
pub use error::{HubError, HubResult, InvocationFailure, ListenerInvocationError};
pub use event::SmartContractEvent;
pub use hub::{EventHub, HubOptions, PublishReport, SubscriptionHandle};
pub use listener::{BoxError, FnListener, Listener, ListenerId, ListenerResult};
pub use pattern::{DEFAULT_DELIMITER, Pattern, WILDCARD};
pub use registry::{ListenerEntry, ListenerRegistry};
