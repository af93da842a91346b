use serde::Deserialize;

/// Main configuration structure for Repo-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Remote API endpoint and credential configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the repository metadata API
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Static bearer token; requests go out unauthenticated when empty
    #[serde(default)]
    pub token: String,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Fetch pipeline behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Number of concurrent workers
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: u32,

    /// Retry attempts for transient failures within a single call
    #[serde(rename = "retry-limit", default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Minimum delay after each processed item, per worker (milliseconds)
    #[serde(rename = "min-interval-ms", default = "default_min_interval")]
    pub min_interval_ms: u64,

    /// Cooldown between retry rounds (seconds)
    #[serde(rename = "round-cooldown-secs", default = "default_round_cooldown")]
    pub round_cooldown_secs: u64,

    /// Maximum number of retry rounds; 0 retries until a round is clean
    #[serde(rename = "max-rounds", default)]
    pub max_rounds: u32,
}

/// Input source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the ranking CSV (repo_id, repo_name, total_openrank columns)
    #[serde(rename = "ranking-path")]
    pub ranking_path: String,
}

/// Output log and report configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the output log of successful records (JSONL, append-only)
    #[serde(rename = "output-path")]
    pub output_path: String,

    /// Path to the success index (JSONL, one line per succeeded repo)
    #[serde(rename = "success-index-path")]
    pub success_index_path: String,

    /// Path to the failed index (JSONL, rewritten each retry round)
    #[serde(rename = "failed-index-path")]
    pub failed_index_path: String,

    /// Path for the aggregate topic report (JSON)
    #[serde(rename = "report-path")]
    pub report_path: String,
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("repo-harvest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    60
}

fn default_max_workers() -> u32 {
    10
}

fn default_retry_limit() -> u32 {
    3
}

fn default_min_interval() -> u64 {
    100
}

fn default_round_cooldown() -> u64 {
    5
}
