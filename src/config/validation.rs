//! Configuration validation.

use crate::config::Config;
use std::collections::HashSet;

/// Validate the configuration.
///
/// Checks for:
/// - Non-empty, unique server names
/// - Non-empty endpoints
/// - Finite, non-negative load signals
/// - A known log level
///
/// An empty server list is accepted; routing against it reports
/// "no servers available" instead of failing at startup.
///
/// # Returns
///
/// `Ok(())` if valid, or an error message describing the problem.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for server in &config.servers {
        if server.name.is_empty() {
            errors.push("server name cannot be empty".to_string());
        } else if !names.insert(server.name.as_str()) {
            errors.push(format!("duplicate server name: {}", server.name));
        }

        if server.endpoint.is_empty() {
            errors.push(format!("server '{}' has an empty endpoint", server.name));
        }

        for (field, value) in [
            ("processing_power", server.processing_power),
            ("average_response_time_ms", server.average_response_time_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!(
                    "server '{}' has {} {} (must be finite and >= 0)",
                    server.name, field, value
                ));
            }
        }
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
