//! First-party caveats.

use chrono::{DateTime, SecondsFormat, Utc};

/// Condition name of the expiry caveat every oven-minted macaroon carries.
pub const COND_TIME_BEFORE: &str = "time-before";

/// A first-party caveat: a condition the verifier checks itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caveat {
    condition: String,
}

impl Caveat {
    /// A caveat with an arbitrary condition string, conventionally
    /// `"<name> <argument>"`.
    #[must_use]
    pub fn first_party(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
        }
    }

    /// A caveat that only holds before `deadline`.
    #[must_use]
    pub fn time_before(deadline: DateTime<Utc>) -> Self {
        Self::first_party(format!(
            "{COND_TIME_BEFORE} {}",
            deadline.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        ))
    }

    /// The condition text.
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Split the condition into its name and argument.
    ///
    /// A condition without a space has an empty argument.
    #[must_use]
    pub fn parse(&self) -> (&str, &str) {
        self.condition
            .split_once(' ')
            .unwrap_or((self.condition.as_str(), ""))
    }
}

impl std::fmt::Display for Caveat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.condition)
    }
}
