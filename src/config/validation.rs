use crate::config::types::{ApiConfig, Config, FetchConfig, InputConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_fetch_config(&config.fetch)?;
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates fetch pipeline configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and 100, got {}",
            config.max_workers
        )));
    }

    if config.retry_limit > 10 {
        return Err(ConfigError::Validation(format!(
            "retry-limit must be <= 10, got {}",
            config.retry_limit
        )));
    }

    Ok(())
}

/// Validates input configuration
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.ranking_path.is_empty() {
        return Err(ConfigError::Validation(
            "ranking-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (key, path) in [
        ("output-path", &config.output_path),
        ("success-index-path", &config.success_index_path),
        ("failed-index-path", &config.failed_index_path),
        ("report-path", &config.report_path),
    ] {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    let mut paths = [
        &config.output_path,
        &config.success_index_path,
        &config.failed_index_path,
    ];
    paths.sort();
    if paths.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(ConfigError::Validation(
            "output-path, success-index-path, and failed-index-path must be distinct".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{ApiConfig, FetchConfig, InputConfig, OutputConfig};

    fn valid_config() -> Config {
        Config {
            api: ApiConfig {
                base_url: "https://api.github.com".to_string(),
                token: String::new(),
                user_agent: "repo-harvest/0.1.0".to_string(),
                request_timeout_secs: 60,
            },
            fetch: FetchConfig {
                max_workers: 10,
                retry_limit: 3,
                min_interval_ms: 100,
                round_cooldown_secs: 5,
                max_rounds: 0,
            },
            input: InputConfig {
                ranking_path: "./ranking.csv".to_string(),
            },
            output: OutputConfig {
                output_path: "./repos_output.jsonl".to_string(),
                success_index_path: "./success_repos.jsonl".to_string(),
                failed_index_path: "./failed_repos.jsonl".to_string(),
                report_path: "./topic_report.json".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = valid_config();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut config = valid_config();
        config.api.base_url = "ftp://api.github.com".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_zero_workers() {
        let mut config = valid_config();
        config.fetch.max_workers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_excessive_retry_limit() {
        let mut config = valid_config();
        config.fetch.retry_limit = 50;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_duplicate_log_paths() {
        let mut config = valid_config();
        config.output.failed_index_path = config.output.output_path.clone();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_paths() {
        let mut config = valid_config();
        config.output.report_path = String::new();
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.input.ranking_path = String::new();
        assert!(validate(&config).is_err());
    }
}
