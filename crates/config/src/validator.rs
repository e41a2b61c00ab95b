use std::collections::HashSet;

use crate::config::Config;
use log::{error, info, warn};

pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub fn validate(config: &Config) -> bool {
    info!("Starting configuration validation...");

    // --- Validate Log level ---
    if !VALID_LOG_LEVELS
        .iter()
        .any(|lvl| lvl.eq_ignore_ascii_case(&config.log.level))
    {
        error!("Invalid log level: {}", config.log.level);
        return false;
    }

    // --- Validate endpoints ---
    if config.cluster.endpoints.is_empty() {
        error!("No endpoints configured");
        return false;
    }

    let mut seen = HashSet::new();
    for (position, endpoint) in config.cluster.endpoints.iter().enumerate() {
        let address = endpoint.address();
        if address.trim().is_empty() {
            error!("Endpoint address is missing at position {}", position);
            return false;
        }

        let failure_rate = endpoint.failure_rate();
        if !(0.0..=1.0).contains(&failure_rate) {
            error!(
                "Failure rate {} for endpoint '{}' must be between 0 and 1",
                failure_rate, address
            );
            return false;
        }

        if !seen.insert(address) {
            warn!(
                "Endpoint '{}' is listed more than once, its entries share one error counter",
                address
            );
        }
    }

    // --- Validate simulation ---
    if config.simulation.requests == 0 {
        error!("Simulation request count is invalid (0)");
        return false;
    }

    if config.simulation.concurrency == 0 {
        error!("Simulation concurrency is invalid (0)");
        return false;
    }

    info!("Configuration validation passed successfully");

    true
}
