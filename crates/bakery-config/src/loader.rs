//! Reading configuration from TOML.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::types::BakeryConfig;
use crate::validate;

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

impl BakeryConfig {
    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, is larger than
    /// 1 MB, is malformed, or fails validation.
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        // Check size after reading to avoid TOCTOU between stat and read.
        let size = content.len() as u64;
        if size > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                path: path.display().to_string(),
                size,
                limit: MAX_CONFIG_FILE_SIZE,
            });
        }

        let config = parse(&content, &path.display().to_string())?;
        info!(path = %path.display(), policies = config.policies.len(), "loaded config");
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the TOML is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        parse(content, "<string>")
    }
}

fn parse(content: &str, path: &str) -> ConfigResult<BakeryConfig> {
    let config: BakeryConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_owned(),
        source: e,
    })?;
    validate::validate(&config)?;
    debug!(path, "config validated");
    Ok(config)
}
