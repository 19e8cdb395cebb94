//! Neohub Telemetry - Logging setup for the neohub event hub.
//!
//! Every neohub crate logs through `tracing`; this crate installs the
//! subscriber that decides where those records go and in which format.
//!
//! # Example
//!
//! ```rust,no_run
//! use neohub_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), neohub_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("neohub_events=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("Hub starting");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
