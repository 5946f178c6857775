use regex_lite::Regex;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one gateway host is configured
/// - Queue size, result cap and poll interval are non-zero
/// - `ignore_titles` compiles as a regex
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.gateway.hosts.is_empty() {
        return Err(ConfigError::ValidationError(
            "gateway.hosts must contain at least one host".to_string(),
        ));
    }

    if config.search.download_torrent_queue == 0 {
        return Err(ConfigError::ValidationError(
            "search.download_torrent_queue cannot be 0".to_string(),
        ));
    }

    if config.search.maximum_results == 0 {
        return Err(ConfigError::ValidationError(
            "search.maximum_results cannot be 0".to_string(),
        ));
    }

    if config.search.interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "search.interval_ms cannot be 0".to_string(),
        ));
    }

    if let Some(ref pattern) = config.search.ignore_titles {
        Regex::new(pattern).map_err(|e| {
            ConfigError::ValidationError(format!("search.ignore_titles is not a valid regex: {}", e))
        })?;
    }

    Ok(())
}
