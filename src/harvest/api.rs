//! Remote API surface
//!
//! Builds the HTTP client and the per-endpoint URL and header sets. The
//! metadata endpoint uses the preview media type that carries topic lists;
//! the readme endpoint uses the plain JSON media type.

use crate::config::ApiConfig;
use crate::{ConfigError, HarvestError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;

/// Accept value for the metadata endpoint (surfaces topics)
const ACCEPT_TOPICS: &str = "application/vnd.github.mercy-preview+json";

/// Accept value for the readme endpoint
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Endpoint and credential state shared by all workers
#[derive(Debug, Clone)]
pub struct Api {
    client: Client,
    base_url: String,
    auth: Option<HeaderValue>,
}

impl Api {
    /// Builds the API surface from configuration
    pub fn new(config: &ApiConfig) -> Result<Self, HarvestError> {
        let client = build_http_client(config)?;
        let auth = if config.token.is_empty() {
            None
        } else {
            let value = HeaderValue::from_str(&format!("Bearer {}", config.token)).map_err(
                |_| {
                    ConfigError::Validation(
                        "token contains characters not valid in a header".to_string(),
                    )
                },
            )?;
            Some(value)
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// The shared HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// URL of the metadata endpoint for a repository
    pub fn repo_url(&self, full_name: &str) -> String {
        format!("{}/repos/{}", self.base_url, full_name)
    }

    /// URL of the readme endpoint for a repository
    pub fn readme_url(&self, full_name: &str) -> String {
        format!("{}/repos/{}/readme", self.base_url, full_name)
    }

    /// Header set for the metadata endpoint
    pub fn repo_headers(&self) -> HeaderMap {
        self.headers(ACCEPT_TOPICS)
    }

    /// Header set for the readme endpoint
    pub fn readme_headers(&self) -> HeaderMap {
        self.headers(ACCEPT_JSON)
    }

    fn headers(&self, accept: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        if let Some(auth) = &self.auth {
            headers.insert(AUTHORIZATION, auth.clone());
        }
        headers
    }
}

/// Builds the HTTP client used for every API call
fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}
