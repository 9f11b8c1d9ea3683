//! Main application configuration
//!
//! This module defines the primary configuration structure for the
//! rally-queue engine, including environment variable loading and
//! validation.

use crate::config::board::BoardSettings;
use crate::config::rules::QueueRules;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rules: QueueRules,
    pub board: BoardSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "rally-queue".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            board: BoardSettings::with_width(5),
            ..Self::default()
        };

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Queue rules
        if let Ok(size) = env::var("MAX_QUEUE_SIZE") {
            config.rules.max_queue_size = size
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_QUEUE_SIZE value: {}", size))?;
        }
        if let Ok(max) = env::var("MAX_QUEUES_PER_CHALLENGER") {
            config.rules.max_queues_per_challenger = max
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_QUEUES_PER_CHALLENGER value: {}", max))?;
        }
        if let Ok(badges) = env::var("BADGE_THRESHOLD") {
            config.rules.badge_threshold = badges
                .parse()
                .map_err(|_| anyhow!("Invalid BADGE_THRESHOLD value: {}", badges))?;
        }
        if let Ok(emblems) = env::var("EMBLEM_THRESHOLD") {
            config.rules.emblem_threshold = emblems
                .parse()
                .map_err(|_| anyhow!("Invalid EMBLEM_THRESHOLD value: {}", emblems))?;
        }
        if let Ok(weight) = env::var("EMBLEM_WEIGHT") {
            config.rules.emblem_weight = weight
                .parse()
                .map_err(|_| anyhow!("Invalid EMBLEM_WEIGHT value: {}", weight))?;
        }

        // Board settings
        if let Ok(width) = env::var("BOARD_WIDTH") {
            config.board.width = width
                .parse()
                .map_err(|_| anyhow!("Invalid BOARD_WIDTH value: {}", width))?;
        }
        if let Ok(excluded) = env::var("BOARD_EXCLUDED_IDS") {
            config.board.excluded = parse_id_list(&excluded);
        }
        if let Ok(multi) = env::var("BOARD_MULTI_IDS") {
            config.board.multi = parse_id_list(&multi);
        }
        if let Ok(shared) = env::var("BOARD_SHARED_IDS") {
            config.board.shared = parse_id_map(&shared)?;
        }

        validate_config(&config)?;
        Ok(config)
    }
}

/// Parse a comma-separated id list, ignoring empty segments
fn parse_id_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a comma-separated list of `variant=canonical` pairs
fn parse_id_map(raw: &str) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (variant, canonical) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid BOARD_SHARED_IDS pair: {}", pair))?;
        map.insert(variant.trim().to_string(), canonical.trim().to_string());
    }
    Ok(map)
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate queue rules
    if config.rules.max_queue_size == 0 {
        return Err(anyhow!("Max queue size must be greater than 0"));
    }
    if config.rules.max_queues_per_challenger == 0 {
        return Err(anyhow!("Max queues per challenger must be greater than 0"));
    }
    if config.rules.emblem_threshold == 0 && config.rules.emblem_weight == 0 {
        return Err(anyhow!(
            "Emblem weight must be greater than 0 when the emblem threshold is 0"
        ));
    }

    // Validate board settings
    if config.board.width < 2 {
        return Err(anyhow!("Board width must be at least 2"));
    }
    for variant in config.board.shared.keys() {
        if config.board.shared.contains_key(config.board.canonical(variant)) {
            return Err(anyhow!(
                "Shared id {} maps to another shared variant",
                variant
            ));
        }
    }

    Ok(())
}
