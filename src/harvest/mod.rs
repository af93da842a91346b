//! Harvest pipeline for repository metadata
//!
//! This module contains the core fetch-and-retry logic, including:
//! - HTTP fetching with outcome classification and bounded backoff
//! - Metadata and readme resolution
//! - Per-item processing with durable record-keeping
//! - Retry-round scheduling over a bounded worker pool

mod api;
mod fetcher;
mod processor;
mod resolvers;
mod scheduler;

pub use api::Api;
pub use fetcher::{fetch_json, FetchOutcome};
pub use processor::process_item;
pub use resolvers::{resolve_info, resolve_readme, RepoInfo, ResolveError};
pub use scheduler::{HarvestSummary, Scheduler};

use crate::config::Config;
use crate::Result;

/// Runs a complete harvest over the configured ranking
///
/// Resumes from the success and failed indices automatically; repositories
/// that already succeeded in a previous run are never re-fetched.
pub async fn run_harvest(config: Config) -> Result<HarvestSummary> {
    let mut scheduler = Scheduler::new(config)?;
    scheduler.run().await
}
