//! Logging setup for bakery services.
//!
//! # Example
//!
//! ```rust,no_run
//! use bakery_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), bakery_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("bakery_rootkeys=debug");
//! setup_logging(&config)?;
//! tracing::info!("bakery starting");
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
pub use logging::{FileRotation, LogConfig, LogFormat, LogTarget, setup_logging};
