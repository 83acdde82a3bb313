//! Commonly used types.
//!
//! ```rust
//! use bakery_telemetry::prelude::*;
//! ```

pub use crate::{LogConfig, LogFormat, LogTarget, TelemetryError, TelemetryResult, setup_logging};
