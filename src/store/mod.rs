//! Durable record store for harvest progress
//!
//! This module handles all persistence for the pipeline, including:
//! - Record schemas for the three newline-delimited JSON logs
//! - Generic JSONL read/append/rewrite helpers
//! - The shared journal serializing all log writes across workers

mod journal;
mod jsonl;

pub use journal::Journal;
pub use jsonl::{append_record, load_records, rewrite_records};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record at {path}:{line}: {source}")]
    Malformed {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One ranking row identifying a repository to fetch
///
/// The identity key is `repo_id`; extra ranking columns are ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub repo_id: String,
    pub repo_name: String,
    pub total_openrank: String,
}

/// Success-index entry: one line per repository that has ever succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessEntry {
    pub repo_id: String,
    pub repo_name: String,
}

/// Full harvest result for one repository
///
/// `success` is true iff metadata resolution succeeded and the readme either
/// resolved or was legitimately absent. `fail_reason` is set exactly when
/// `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub repo_id: String,
    pub repo_name: String,
    pub total_openrank: String,
    pub description: Option<String>,
    pub homepage_url: Option<String>,
    pub topics: Vec<String>,
    pub readme_text: Option<String>,
    pub success: bool,
    pub fail_reason: Option<String>,
}

impl ResultRecord {
    /// The work item this record was produced from
    pub fn work_item(&self) -> WorkItem {
        WorkItem {
            repo_id: self.repo_id.clone(),
            repo_name: self.repo_name.clone(),
            total_openrank: self.total_openrank.clone(),
        }
    }
}
