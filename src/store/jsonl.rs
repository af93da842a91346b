//! Newline-delimited JSON helpers
//!
//! One JSON record per line. Blank lines are skipped on read so a log
//! survives a stray trailing newline.

use crate::store::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Loads every record from a JSONL file
///
/// A missing file yields an empty list, so callers can treat "never ran
/// before" and "ran with no results" the same way.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| StoreError::Malformed {
            path: path.display().to_string(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Appends one record as a single JSON line to an open handle
pub fn append_record<T: Serialize>(file: &mut File, record: &T) -> StoreResult<()> {
    let line = serde_json::to_string(record)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Truncates the handle and writes the given records, one per line
///
/// The handle must be open in append mode so the writes land at the new end.
pub fn rewrite_records<T: Serialize>(file: &mut File, records: &[T]) -> StoreResult<()> {
    file.set_len(0)?;
    for record in records {
        append_record(file, record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorkItem;
    use std::fs::OpenOptions;
    use tempfile::TempDir;

    fn item(id: &str) -> WorkItem {
        WorkItem {
            repo_id: id.to_string(),
            repo_name: format!("owner/{}", id),
            total_openrank: "1.0".to_string(),
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let records: Vec<WorkItem> = load_records(&dir.path().join("missing.jsonl")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_append_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.jsonl");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();

        append_record(&mut file, &item("1")).unwrap();
        append_record(&mut file, &item("2")).unwrap();

        let records: Vec<WorkItem> = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].repo_id, "1");
        assert_eq!(records[1].repo_id, "2");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.jsonl");
        let line = serde_json::to_string(&item("1")).unwrap();
        std::fs::write(&path, format!("{}\n\n  \n", line)).unwrap();

        let records: Vec<WorkItem> = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_malformed_line_reports_location() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.jsonl");
        std::fs::write(&path, "{\"repo_id\": \n").unwrap();

        let result: StoreResult<Vec<WorkItem>> = load_records(&path);
        match result {
            Err(StoreError::Malformed { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected Malformed, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.jsonl");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();

        append_record(&mut file, &item("1")).unwrap();
        append_record(&mut file, &item("2")).unwrap();
        rewrite_records(&mut file, &[item("3")]).unwrap();

        let records: Vec<WorkItem> = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].repo_id, "3");
    }

    #[test]
    fn test_rewrite_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.jsonl");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();

        append_record(&mut file, &item("1")).unwrap();
        rewrite_records::<WorkItem>(&mut file, &[]).unwrap();

        let records: Vec<WorkItem> = load_records(&path).unwrap();
        assert!(records.is_empty());
    }
}
