//! Report generation from the output log
//!
//! This module loads harvested records and renders the aggregate topic
//! statistics, both as a formatted stdout summary and as a JSON report file.

pub mod stats;

pub use stats::{compute_report, print_report, SampleRepository, TopicCount, TopicReport};

use crate::store::{load_records, ResultRecord};
use crate::Result;
use std::fs::File;
use std::path::Path;

/// Loads every harvested record from the output log
pub fn load_harvested(path: &Path) -> Result<Vec<ResultRecord>> {
    Ok(load_records(path)?)
}

/// Computes the report over the output log and writes it as pretty JSON
pub fn export_report(output_log: &Path, report_path: &Path) -> Result<TopicReport> {
    let records = load_harvested(output_log)?;
    let report = compute_report(&records);
    let file = File::create(report_path)?;
    serde_json::to_writer_pretty(file, &report)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::append_record;
    use std::fs::OpenOptions;
    use tempfile::TempDir;

    #[test]
    fn test_export_report_writes_json() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("out.jsonl");
        let report_path = dir.path().join("report.json");

        let record = ResultRecord {
            repo_id: "1".to_string(),
            repo_name: "a/a".to_string(),
            total_openrank: "1.0".to_string(),
            description: Some("d".to_string()),
            homepage_url: None,
            topics: vec!["x".to_string()],
            readme_text: None,
            success: true,
            fail_reason: None,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .unwrap();
        append_record(&mut file, &record).unwrap();

        let report = export_report(&log_path, &report_path).unwrap();
        assert_eq!(report.total_repositories, 1);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(written["total_repositories"], 1);
        assert_eq!(written["topic_frequency"]["x"], 1);
    }

    #[test]
    fn test_export_report_on_missing_log() {
        let dir = TempDir::new().unwrap();
        let report = export_report(
            &dir.path().join("missing.jsonl"),
            &dir.path().join("report.json"),
        )
        .unwrap();
        assert_eq!(report.total_repositories, 0);
    }
}
