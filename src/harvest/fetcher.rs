//! HTTP fetch and outcome classification
//!
//! This module performs all remote calls for the pipeline, including:
//! - One GET per call with the caller's header set
//! - Bounded exponential backoff for transport errors and soft rate limits
//! - A blocking pause when the remote quota is exhausted
//! - Classification of every response into a fetch outcome

use crate::config::FetchConfig;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Extra seconds slept past the advertised quota reset
const RESET_MARGIN_SECS: i64 = 5;

/// Smallest pause honored when the quota is exhausted
const RATE_LIMIT_FLOOR_SECS: i64 = 10;

/// Classified result of one fetch call, including its retry chain
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// HTTP 200 with a parsed JSON body
    Success(Value),

    /// HTTP 404, a definitive outcome that is never retried
    NotFound,

    /// HTTP 403/429, after the quota pause or after exhausted retries
    RateLimited(u16),

    /// Any other HTTP status, returned without retrying
    OtherStatus(u16),

    /// Transport failure after exhausted retries
    Transport { kind: String, message: String },
}

/// Fetches a URL and classifies the response
///
/// Transient conditions (transport errors, 403/429 with quota remaining) are
/// retried up to `retry-limit` times with a `2^attempt` second backoff. When
/// the quota headers show zero remaining requests, the call sleeps until the
/// advertised reset plus a margin (never less than 10 s) and then reports
/// `RateLimited` so the caller decides whether to re-issue. The pause is
/// per-call; workers hitting the shared limit concurrently may each sleep.
pub async fn fetch_json(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
    fetch: &FetchConfig,
) -> FetchOutcome {
    let mut attempt = 0u32;
    loop {
        let response = match client.get(url).headers(headers.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                if attempt < fetch.retry_limit {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                    attempt += 1;
                    continue;
                }
                return FetchOutcome::Transport {
                    kind: classify_transport(&err),
                    message: err.to_string(),
                };
            }
        };

        let status = response.status();
        match status {
            StatusCode::OK => match response.json::<Value>().await {
                Ok(payload) => return FetchOutcome::Success(payload),
                Err(err) => {
                    if attempt < fetch.retry_limit {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    return FetchOutcome::Transport {
                        kind: "decode".to_string(),
                        message: err.to_string(),
                    };
                }
            },
            StatusCode::NOT_FOUND => return FetchOutcome::NotFound,
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                if let Some(pause) = quota_pause(response.headers()) {
                    tracing::warn!(
                        "Rate limit exhausted on {}, pausing {}s",
                        url,
                        pause.as_secs()
                    );
                    tokio::time::sleep(pause).await;
                    return FetchOutcome::RateLimited(status.as_u16());
                }
                if attempt < fetch.retry_limit {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                    attempt += 1;
                    continue;
                }
                return FetchOutcome::RateLimited(status.as_u16());
            }
            other => return FetchOutcome::OtherStatus(other.as_u16()),
        }
    }
}

/// Backoff before retry number `attempt` (2^attempt seconds)
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Pause required by exhausted quota headers
///
/// Returns the time until the advertised reset plus [`RESET_MARGIN_SECS`],
/// floored at [`RATE_LIMIT_FLOOR_SECS`], only when the remaining-quota
/// header reads zero and a reset timestamp is present.
fn quota_pause(headers: &HeaderMap) -> Option<Duration> {
    let remaining = header_str(headers, "x-ratelimit-remaining")?;
    if remaining != "0" {
        return None;
    }

    let reset = header_str(headers, "x-ratelimit-reset")?.parse::<i64>().ok()?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    let wait = (reset - now + RESET_MARGIN_SECS).max(RATE_LIMIT_FLOOR_SECS);
    Some(Duration::from_secs(wait as u64))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Sorts a transport error into a stable kind label
fn classify_transport(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_decode() {
        "decode"
    } else {
        "request"
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn unix_now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn rate_limit_headers(remaining: &str, reset: i64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-ratelimit-remaining",
            HeaderValue::from_str(remaining).unwrap(),
        );
        headers.insert(
            "x-ratelimit-reset",
            HeaderValue::from_str(&reset.to_string()).unwrap(),
        );
        headers
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_quota_pause_honors_floor() {
        // Reset only 2 seconds out: the floor still applies
        let headers = rate_limit_headers("0", unix_now() + 2);
        let pause = quota_pause(&headers).unwrap();
        assert_eq!(pause, Duration::from_secs(10));
    }

    #[test]
    fn test_quota_pause_uses_reset_plus_margin() {
        let headers = rate_limit_headers("0", unix_now() + 60);
        let pause = quota_pause(&headers).unwrap();
        assert!(pause >= Duration::from_secs(60));
        assert!(pause <= Duration::from_secs(66));
    }

    #[test]
    fn test_no_pause_when_quota_remains() {
        let headers = rate_limit_headers("42", unix_now() + 60);
        assert_eq!(quota_pause(&headers), None);
    }

    #[test]
    fn test_no_pause_without_reset_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        assert_eq!(quota_pause(&headers), None);
    }

    #[test]
    fn test_no_pause_with_unparseable_reset() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("soon"));
        assert_eq!(quota_pause(&headers), None);
    }
}
