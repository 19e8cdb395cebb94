//! Prelude module - commonly used types for convenient import.
//!
//! Use `use neohub_events::prelude::*;` to import all essential types.

// Hub
pub use crate::{EventHub, HubOptions, PublishReport, SubscriptionHandle};

// Listeners
pub use crate::{FnListener, Listener, ListenerId, ListenerResult};

// Events
pub use crate::{SmartContractEvent, dispatch_domain_event, dispatch_smart_contract_event};

// Errors
pub use crate::{HubError, HubResult, ListenerInvocationError};

// Async bridge
#[cfg(feature = "runtime")]
pub use crate::{Delivery, EventReceiver};
