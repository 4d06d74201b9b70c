//! Configuration data types.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// Selection strategy
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Servers to seed the pool with, in routing order
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Strategy selection.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StrategyConfig {
    /// Selection algorithm
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Weighting scheme for `weighted_round_robin`
    #[serde(default)]
    pub weighted_mode: WeightedMode,
}

/// Server selection algorithm.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    RoundRobin,
    Random,
    LeastBusy,
    WeightedResponseTime,
    WeightedRoundRobin,
}

/// How weighted round robin turns weights into turns.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeightedMode {
    /// Selection frequency proportional to processing power
    #[default]
    Smooth,
    /// One turn per server per rotation, heaviest first
    SortedRotation,
}

/// Individual server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Unique server name
    pub name: String,

    /// Endpoint handed to the transport layer
    pub endpoint: String,

    /// Capacity weight (default: 1.0)
    #[serde(default = "default_processing_power")]
    pub processing_power: f64,

    /// Initial average response time in milliseconds (default: 0.0)
    #[serde(default)]
    pub average_response_time_ms: f64,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_processing_power() -> f64 {
    1.0
}
