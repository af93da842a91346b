//! Repo-Harvest: a resumable repository metadata harvester
//!
//! This crate fetches the description, topics, and README text for a ranked
//! list of repositories over a remote API, persists progress so interrupted
//! runs resume without re-fetching, and produces aggregate topic statistics.

pub mod config;
pub mod harvest;
pub mod input;
pub mod report;
pub mod store;

use thiserror::Error;

/// Main error type for Repo-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ranking input error: {0}")]
    Input(#[from] csv::Error),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Worker failure: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Repo-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{run_harvest, FetchOutcome, ResolveError};
pub use report::TopicReport;
pub use store::{ResultRecord, SuccessEntry, WorkItem};
