//! Metadata and readme resolution on top of the fetcher
//!
//! Each resolver makes one fetch call and maps its outcome to either a typed
//! value or a [`ResolveError`] whose `tag` renders the stable reason string
//! recorded in result records.

use crate::config::FetchConfig;
use crate::harvest::api::Api;
use crate::harvest::fetcher::{fetch_json, FetchOutcome};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};

/// Repository metadata extracted from the API payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoInfo {
    pub description: Option<String>,
    pub homepage_url: Option<String>,
    pub topics: Vec<String>,
}

/// Why a resolution step failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The endpoint returned 404; for readmes this is not fatal overall
    NotFound,

    /// Rate limited or forbidden, carrying the HTTP status
    RateLimited(u16),

    /// Any other HTTP status
    Status(u16),

    /// Transport failure after the fetcher exhausted its retries
    Transport { kind: String, message: String },

    /// The readme content field did not decode
    Decode(String),

    /// The readme payload carried no content field
    MissingContent,

    /// The payload was not the JSON object the endpoint documents
    Unknown,
}

impl ResolveError {
    /// Stable reason string for durable records
    pub fn tag(&self) -> String {
        match self {
            Self::NotFound => "not_found".to_string(),
            Self::RateLimited(code) => format!("rate_limit_or_forbidden_{code}"),
            Self::Status(code) => format!("status_{code}"),
            Self::Transport { kind, message } => format!("exception_{kind}: {message}"),
            Self::Decode(kind) => format!("decode_error_{kind}"),
            Self::MissingContent => "no_content_field".to_string(),
            Self::Unknown => "unknown_error".to_string(),
        }
    }
}

/// Resolves description, homepage, and topics for a repository
///
/// A missing topics field maps to an empty list; missing description or
/// homepage map to `None`.
pub async fn resolve_info(
    api: &Api,
    fetch: &FetchConfig,
    full_name: &str,
) -> Result<RepoInfo, ResolveError> {
    let url = api.repo_url(full_name);
    let outcome = fetch_json(api.client(), &url, &api.repo_headers(), fetch).await;
    let payload = expect_object(outcome)?;

    Ok(RepoInfo {
        description: string_field(&payload, "description"),
        homepage_url: string_field(&payload, "homepage"),
        topics: payload
            .get("topics")
            .and_then(Value::as_array)
            .map(|topics| {
                topics
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    })
}

/// Resolves the readme body for a repository, base64-decoded to text
pub async fn resolve_readme(
    api: &Api,
    fetch: &FetchConfig,
    full_name: &str,
) -> Result<String, ResolveError> {
    let url = api.readme_url(full_name);
    let outcome = fetch_json(api.client(), &url, &api.readme_headers(), fetch).await;
    let payload = expect_object(outcome)?;

    let content = payload
        .get("content")
        .and_then(Value::as_str)
        .ok_or(ResolveError::MissingContent)?;
    decode_content(content)
}

/// Decodes the base64 content field to text
///
/// The API wraps the base64 body in newlines, so whitespace is stripped
/// before decoding. Invalid UTF-8 sequences are replaced rather than failing
/// the decode.
fn decode_content(content: &str) -> Result<String, ResolveError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| ResolveError::Decode("base64".to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Narrows a fetch outcome to its JSON object payload
fn expect_object(outcome: FetchOutcome) -> Result<Map<String, Value>, ResolveError> {
    match outcome {
        FetchOutcome::Success(Value::Object(payload)) => Ok(payload),
        FetchOutcome::Success(_) => Err(ResolveError::Unknown),
        FetchOutcome::NotFound => Err(ResolveError::NotFound),
        FetchOutcome::RateLimited(code) => Err(ResolveError::RateLimited(code)),
        FetchOutcome::OtherStatus(code) => Err(ResolveError::Status(code)),
        FetchOutcome::Transport { kind, message } => Err(ResolveError::Transport { kind, message }),
    }
}

fn string_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}
