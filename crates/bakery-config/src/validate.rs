//! Configuration validation.
//!
//! Checks value ranges and that every policy name the oven refers to exists.

use crate::error::{ConfigError, ConfigResult};
use crate::types::BakeryConfig;

/// Highest identifier format version an oven can mint.
const LATEST_VERSION: u8 = 3;

/// Validate a deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &BakeryConfig) -> ConfigResult<()> {
    validate_cache(config)?;
    validate_policies(config)?;
    validate_oven(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn unknown_policy(field: impl Into<String>, policy: &str) -> ConfigError {
    ConfigError::UnknownPolicy {
        field: field.into(),
        policy: policy.to_owned(),
    }
}

fn validate_cache(config: &BakeryConfig) -> ConfigResult<()> {
    if config.cache.max_cache_size == 0 {
        return Err(invalid("cache.max_cache_size", "must be at least 1"));
    }
    Ok(())
}

fn validate_policies(config: &BakeryConfig) -> ConfigResult<()> {
    for (name, policy) in &config.policies {
        if policy.expiry_secs == 0 {
            return Err(invalid(
                format!("policies.{name}.expiry_secs"),
                "expiry must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_oven(config: &BakeryConfig) -> ConfigResult<()> {
    let oven = &config.oven;

    if oven.location.trim().is_empty() {
        return Err(invalid("oven.location", "location must not be empty"));
    }

    if !(1..=LATEST_VERSION).contains(&oven.version) {
        return Err(invalid(
            "oven.version",
            format!(
                "unsupported version {}; expected 1 to {LATEST_VERSION}",
                oven.version
            ),
        ));
    }

    if !config.policies.contains_key(&oven.policy) {
        return Err(unknown_policy("oven.policy", &oven.policy));
    }

    for (prefix, policy) in &oven.routes {
        if !config.policies.contains_key(policy) {
            return Err(unknown_policy(format!("oven.routes.{prefix}"), policy));
        }
    }

    if let Some(op) = &oven.legacy_op
        && (op.entity.is_empty() || op.action.is_empty())
    {
        return Err(invalid(
            "oven.legacy_op",
            "entity and action must not be empty",
        ));
    }

    Ok(())
}

fn validate_logging(config: &BakeryConfig) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    Ok(())
}
