//! Shared append journal for harvest progress
//!
//! Every durable write goes through a single mutex so concurrent workers
//! never interleave partial lines in the same log or double-append a
//! success-index entry.

use crate::config::OutputConfig;
use crate::store::{jsonl, ResultRecord, StoreResult, SuccessEntry, WorkItem};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

/// Durable progress journal shared by all workers
///
/// Owns open append handles for the output log, the success index, and the
/// failed index, plus the in-memory set of repo ids that have ever
/// succeeded (seeded from the success index at open time).
pub struct Journal {
    inner: Mutex<Inner>,
}

struct Inner {
    output: File,
    success: File,
    failed: File,
    success_ids: HashSet<String>,
}

impl Journal {
    /// Opens the three logs, creating them if absent
    ///
    /// The success index is read first so `is_succeeded` reflects every
    /// previous run.
    pub fn open(config: &OutputConfig) -> StoreResult<Self> {
        let entries: Vec<SuccessEntry> =
            jsonl::load_records(Path::new(&config.success_index_path))?;
        let success_ids = entries.into_iter().map(|entry| entry.repo_id).collect();

        Ok(Self {
            inner: Mutex::new(Inner {
                output: open_append(&config.output_path)?,
                success: open_append(&config.success_index_path)?,
                failed: open_append(&config.failed_index_path)?,
                success_ids,
            }),
        })
    }

    /// Whether a repository has already succeeded in any run
    pub fn is_succeeded(&self, repo_id: &str) -> bool {
        self.inner.lock().unwrap().success_ids.contains(repo_id)
    }

    /// Number of repositories known to have succeeded
    pub fn succeeded_count(&self) -> usize {
        self.inner.lock().unwrap().success_ids.len()
    }

    /// Appends a successful record to the output log and, for a first-time
    /// success, an entry to the success index
    pub fn record_success(&self, record: &ResultRecord) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        jsonl::append_record(&mut inner.output, record)?;
        if !inner.success_ids.contains(&record.repo_id) {
            let entry = SuccessEntry {
                repo_id: record.repo_id.clone(),
                repo_name: record.repo_name.clone(),
            };
            jsonl::append_record(&mut inner.success, &entry)?;
            inner.success_ids.insert(record.repo_id.clone());
        }
        Ok(())
    }

    /// Appends a failed record to the failed index
    pub fn record_failure(&self, record: &ResultRecord) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        jsonl::append_record(&mut inner.failed, record)
    }

    /// Replaces the failed index with the given work items
    pub fn reset_failed(&self, items: &[WorkItem]) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        jsonl::rewrite_records(&mut inner.failed, items)
    }
}

fn open_append(path: &str) -> StoreResult<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::load_records;
    use tempfile::TempDir;

    fn test_output_config(dir: &TempDir) -> OutputConfig {
        OutputConfig {
            output_path: dir.path().join("out.jsonl").display().to_string(),
            success_index_path: dir.path().join("success.jsonl").display().to_string(),
            failed_index_path: dir.path().join("failed.jsonl").display().to_string(),
            report_path: dir.path().join("report.json").display().to_string(),
        }
    }

    fn success_record(id: &str) -> ResultRecord {
        ResultRecord {
            repo_id: id.to_string(),
            repo_name: format!("owner/{}", id),
            total_openrank: "1.0".to_string(),
            description: Some("d".to_string()),
            homepage_url: None,
            topics: vec![],
            readme_text: None,
            success: true,
            fail_reason: None,
        }
    }

    fn failed_record(id: &str) -> ResultRecord {
        ResultRecord {
            success: false,
            fail_reason: Some("status_500".to_string()),
            description: None,
            ..success_record(id)
        }
    }

    #[test]
    fn test_success_index_is_write_once() {
        let dir = TempDir::new().unwrap();
        let config = test_output_config(&dir);
        let journal = Journal::open(&config).unwrap();

        journal.record_success(&success_record("1")).unwrap();
        journal.record_success(&success_record("1")).unwrap();

        let entries: Vec<SuccessEntry> =
            load_records(Path::new(&config.success_index_path)).unwrap();
        assert_eq!(entries.len(), 1);

        // The output log still carries both appends
        let records: Vec<ResultRecord> = load_records(Path::new(&config.output_path)).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_success_ids_seeded_from_existing_index() {
        let dir = TempDir::new().unwrap();
        let config = test_output_config(&dir);

        {
            let journal = Journal::open(&config).unwrap();
            journal.record_success(&success_record("1")).unwrap();
        }

        let journal = Journal::open(&config).unwrap();
        assert!(journal.is_succeeded("1"));
        assert!(!journal.is_succeeded("2"));
        assert_eq!(journal.succeeded_count(), 1);

        // Re-recording after a restart must not duplicate the index entry
        journal.record_success(&success_record("1")).unwrap();
        let entries: Vec<SuccessEntry> =
            load_records(Path::new(&config.success_index_path)).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_index_reset() {
        let dir = TempDir::new().unwrap();
        let config = test_output_config(&dir);
        let journal = Journal::open(&config).unwrap();

        journal.record_failure(&failed_record("1")).unwrap();
        journal.record_failure(&failed_record("2")).unwrap();

        let items = vec![failed_record("2").work_item()];
        journal.reset_failed(&items).unwrap();

        let loaded: Vec<WorkItem> =
            load_records(Path::new(&config.failed_index_path)).unwrap();
        assert_eq!(loaded, items);

        journal.reset_failed(&[]).unwrap();
        let loaded: Vec<WorkItem> =
            load_records(Path::new(&config.failed_index_path)).unwrap();
        assert!(loaded.is_empty());
    }
}
