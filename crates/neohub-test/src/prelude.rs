//! Prelude module - commonly used test utilities.
//!
//! Use `use neohub_test::prelude::*;` in test modules.

pub use crate::fixtures::{init_test_logging, test_contract_event, test_hub};
pub use crate::mocks::{CallLog, FailingListener, OrderProbe, PanickingListener, RecordingListener};
