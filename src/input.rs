//! Ranking input loading
//!
//! The ranking is a CSV with at least `repo_id`, `repo_name`, and
//! `total_openrank` columns; any further columns are ignored. The whole file
//! is read into memory once at startup.

use crate::store::WorkItem;
use crate::Result;
use std::path::Path;

/// Loads every ranking row as a work item
pub fn load_ranking(path: &Path) -> Result<Vec<WorkItem>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut items = Vec::new();
    for row in reader.deserialize() {
        items.push(row?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_ranking() {
        let file = create_temp_csv(
            "repo_id,repo_name,total_openrank\n1,owner/repo,5.0\n2,other/repo,3.5\n",
        );
        let items = load_ranking(file.path()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].repo_id, "1");
        assert_eq!(items[0].repo_name, "owner/repo");
        assert_eq!(items[0].total_openrank, "5.0");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let file = create_temp_csv(
            "repo_id,repo_name,total_openrank,stars\n1,owner/repo,5.0,1234\n",
        );
        let items = load_ranking(file.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].repo_id, "1");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let file = create_temp_csv("repo_id,repo_name\n1,owner/repo\n");
        assert!(load_ranking(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_ranking(Path::new("/nonexistent/ranking.csv")).is_err());
    }
}
