//! Process-wide hub for smart contract events.
//!
//! Prefer passing an [`EventHub`] explicitly. This module exists for code
//! that has no way to receive one, such as deep inside the VM interop layer.

use std::sync::OnceLock;

use tracing::debug;

use crate::error::{HubError, HubResult};
use crate::event::SmartContractEvent;
use crate::hub::{EventHub, HubOptions};

static GLOBAL_HUB: OnceLock<EventHub<SmartContractEvent>> = OnceLock::new();

/// The process-wide hub, built with default options on first use.
pub fn hub() -> &'static EventHub<SmartContractEvent> {
    GLOBAL_HUB.get_or_init(|| {
        debug!("Initializing process-wide event hub with default options");
        EventHub::new()
    })
}

/// Build the process-wide hub with explicit options.
///
/// # Errors
///
/// Returns [`HubError::InvalidDelimiter`] for unusable options, or
/// [`HubError::AlreadyInitialized`] if the hub was already built, either by
/// an earlier `init` or by a call to [`hub`].
pub fn init(options: HubOptions) -> HubResult<&'static EventHub<SmartContractEvent>> {
    options.validate()?;
    let mut installed = false;
    let hub = GLOBAL_HUB.get_or_init(|| {
        installed = true;
        debug!(?options, "Initializing process-wide event hub");
        EventHub::from_validated(options)
    });

    if installed {
        Ok(hub)
    } else {
        Err(HubError::AlreadyInitialized)
    }
}

/// Whether the process-wide hub has been built.
#[must_use]
pub fn is_initialized() -> bool {
    GLOBAL_HUB.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global is shared by every test in this binary, so only
    // order-independent facts are checked here.
    #[test]
    fn test_hub_is_a_singleton() {
        let a = hub();
        let b = hub();
        assert!(std::ptr::eq(a, b));
        assert!(is_initialized());
        assert!(matches!(
            init(HubOptions::default()),
            Err(HubError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_init_rejects_bad_delimiter() {
        assert!(matches!(
            init(HubOptions::default().with_delimiter('*')),
            Err(HubError::InvalidDelimiter { delimiter: '*', .. })
        ));
    }
}
