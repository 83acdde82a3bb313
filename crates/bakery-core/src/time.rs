//! Saturating timestamp arithmetic.
//!
//! Policies carry `std::time::Duration`s which may exceed what `chrono` can
//! represent. These helpers clamp to the representable range instead of
//! panicking, so an absurdly long policy simply means "forever".

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// `t + d`, clamped to [`DateTime::<Utc>::MAX_UTC`].
#[must_use]
pub fn saturating_add(t: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(d)
        .ok()
        .and_then(|delta| t.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// `t - d`, clamped to [`DateTime::<Utc>::MIN_UTC`].
#[must_use]
pub fn saturating_sub(t: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(d)
        .ok()
        .and_then(|delta| t.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
