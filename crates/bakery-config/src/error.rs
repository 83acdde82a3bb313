use std::io;
use thiserror::Error;

/// Errors from loading a bakery configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read bakery config {path}: {source}")]
    ReadError {
        /// Path that was read, or `<string>` for inline TOML.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The config file exceeds the size limit.
    #[error("bakery config {path} is {size} bytes; the limit is {limit}")]
    TooLarge {
        /// Path that was read.
        path: String,
        /// Bytes read.
        size: u64,
        /// Largest accepted size in bytes.
        limit: u64,
    },

    /// The TOML is malformed or a value has the wrong type.
    #[error("cannot parse bakery config {path}: {source}")]
    ParseError {
        /// Path that was read, or `<string>` for inline TOML.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// `oven.policy` or an `oven.routes` entry names an undefined policy.
    #[error("{field} names policy '{policy}', which is not defined under [policies]")]
    UnknownPolicy {
        /// Dotted key of the reference, e.g. `oven.routes.admin-`.
        field: String,
        /// The missing policy name.
        policy: String,
    },

    /// A value is out of range.
    #[error("invalid {field}: {message}")]
    ValidationError {
        /// Dotted key of the offending value, e.g. `cache.max_cache_size`.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// Dotted key of the offending value, for errors tied to one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownPolicy { field, .. } | Self::ValidationError { field, .. } => {
                Some(field.as_str())
            },
            Self::ReadError { .. } | Self::TooLarge { .. } | Self::ParseError { .. } => None,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
