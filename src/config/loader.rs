//! Configuration loading from files.

use std::fs;
use std::path::Path;

use crate::error::{ConfigurationError, Error, Result};

use super::BenchConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_loadtest::load_config;
///
/// let config = load_config("bench.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BenchConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        Error::Configuration(ConfigurationError::Io(truncate(&e.to_string())))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<BenchConfig> {
    let config: BenchConfig = toml::from_str(content).map_err(|e| {
        Error::Configuration(ConfigurationError::Toml(truncate(e.message())))
    })?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}

fn truncate(msg: &str) -> heapless::String<128> {
    let mut out = heapless::String::new();
    for c in msg.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
