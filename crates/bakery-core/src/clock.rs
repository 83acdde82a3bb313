use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// The root-key cache never reads ambient time directly; it is handed a
/// `Clock` at construction so tests can drive it deterministically.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
