//! Retry-round scheduling over a bounded worker pool
//!
//! The pending set starts as every ranking row that has not yet succeeded,
//! merged with any failures a previous run persisted. Each round dispatches
//! the whole set across the worker pool, collects the failures, rewrites the
//! failed index with them, and retries only those after a cooldown, until a
//! round comes back clean or the configured round ceiling is reached.

use crate::config::Config;
use crate::harvest::api::Api;
use crate::harvest::processor::process_item;
use crate::input;
use crate::store::{load_records, Journal, WorkItem};
use crate::{HarvestError, Result};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Final tally of a harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Items pending when the run started
    pub initial_pending: usize,

    /// Rounds executed
    pub rounds: usize,

    /// Items still failing when the run stopped
    pub remaining_failures: usize,
}

/// Drives retry rounds over the worker pool
pub struct Scheduler {
    config: Arc<Config>,
    api: Api,
    journal: Arc<Journal>,
}

impl Scheduler {
    /// Creates a scheduler, opening the journal and the HTTP client
    pub fn new(config: Config) -> Result<Self> {
        let api = Api::new(&config.api)?;
        let journal = Arc::new(Journal::open(&config.output)?);
        Ok(Self {
            config: Arc::new(config),
            api,
            journal,
        })
    }

    /// Runs rounds until one produces zero failures or the ceiling hits
    pub async fn run(&mut self) -> Result<HarvestSummary> {
        let mut pending = self.load_pending()?;
        let initial_pending = pending.len();
        tracing::info!(
            "{} items pending ({} already succeeded)",
            pending.len(),
            self.journal.succeeded_count()
        );

        // From here on the failed index reflects only the current run
        self.journal.reset_failed(&[])?;

        let max_rounds = self.config.fetch.max_rounds as usize;
        let mut rounds = 0usize;
        while !pending.is_empty() {
            if max_rounds > 0 && rounds >= max_rounds {
                tracing::warn!(
                    "Stopping after {} rounds with {} items still failing",
                    rounds,
                    pending.len()
                );
                break;
            }

            rounds += 1;
            tracing::info!("Round {}: dispatching {} items", rounds, pending.len());

            let failed_next = self.run_round(&pending).await?;
            if failed_next.is_empty() {
                pending.clear();
                break;
            }

            tracing::info!("{} items failed, retrying next round", failed_next.len());
            self.journal.reset_failed(&failed_next)?;
            pending = failed_next;
            tokio::time::sleep(Duration::from_secs(self.config.fetch.round_cooldown_secs)).await;
        }

        Ok(HarvestSummary {
            initial_pending,
            rounds,
            remaining_failures: pending.len(),
        })
    }

    /// Computes the pending set
    ///
    /// Ranking rows not yet succeeded, plus failures persisted by a previous
    /// run. Deduplicated by `repo_id`; the ranking row wins on conflict.
    fn load_pending(&self) -> Result<Vec<WorkItem>> {
        let rows = input::load_ranking(Path::new(&self.config.input.ranking_path))?;
        let mut pending: Vec<WorkItem> = rows
            .into_iter()
            .filter(|row| !self.journal.is_succeeded(&row.repo_id))
            .collect();

        let mut seen: HashSet<String> = pending.iter().map(|item| item.repo_id.clone()).collect();
        let prior_failures: Vec<WorkItem> =
            load_records(Path::new(&self.config.output.failed_index_path))?;
        for item in prior_failures {
            if !self.journal.is_succeeded(&item.repo_id) && seen.insert(item.repo_id.clone()) {
                pending.push(item);
            }
        }

        Ok(pending)
    }

    /// Dispatches one round across the worker pool
    ///
    /// Every item is processed to completion; completion order is not
    /// guaranteed. Returns the work items to retry next round.
    async fn run_round(&self, pending: &[WorkItem]) -> Result<Vec<WorkItem>> {
        let semaphore = Arc::new(Semaphore::new(self.config.fetch.max_workers as usize));
        let mut handles = Vec::with_capacity(pending.len());

        for item in pending.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let api = self.api.clone();
            let fetch = self.config.fetch.clone();
            let journal = Arc::clone(&self.journal);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| HarvestError::Worker("worker pool closed".to_string()))?;
                process_item(&api, &fetch, item, &journal).await
            }));
        }

        let mut failed_next = Vec::new();
        for handle in handles {
            let record = handle
                .await
                .map_err(|err| HarvestError::Worker(err.to_string()))??;
            if !record.success {
                failed_next.push(record.work_item());
            }
        }

        Ok(failed_next)
    }
}
