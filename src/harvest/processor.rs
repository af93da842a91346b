//! Per-item processing and durable record-keeping

use crate::config::FetchConfig;
use crate::harvest::api::Api;
use crate::harvest::resolvers::{resolve_info, resolve_readme, RepoInfo, ResolveError};
use crate::store::{Journal, ResultRecord, WorkItem};
use std::time::Duration;

/// Processes one work item end to end
///
/// Resolves metadata and readme, merges both into a record, appends the
/// record to exactly one of the output log or the failed index, and then
/// sleeps the per-worker minimum interval. A missing readme alone never
/// fails the item; when both resolutions fail, the metadata reason wins.
/// Journal write errors are fatal and abort the run.
pub async fn process_item(
    api: &Api,
    fetch: &FetchConfig,
    item: WorkItem,
    journal: &Journal,
) -> crate::Result<ResultRecord> {
    let mut success = true;
    let mut fail_reason = None;

    let info = match resolve_info(api, fetch, &item.repo_name).await {
        Ok(info) => info,
        Err(err) => {
            success = false;
            fail_reason = Some(err.tag());
            RepoInfo::default()
        }
    };

    let readme_text = match resolve_readme(api, fetch, &item.repo_name).await {
        Ok(text) => Some(text),
        // Repos legitimately lack a readme
        Err(ResolveError::NotFound) => None,
        Err(err) => {
            success = false;
            if fail_reason.is_none() {
                fail_reason = Some(err.tag());
            }
            None
        }
    };

    let record = ResultRecord {
        repo_id: item.repo_id,
        repo_name: item.repo_name,
        total_openrank: item.total_openrank,
        description: info.description,
        homepage_url: info.homepage_url,
        topics: info.topics,
        readme_text,
        success,
        fail_reason,
    };

    if record.success {
        journal.record_success(&record)?;
        tracing::info!("{}: ok", record.repo_name);
    } else {
        journal.record_failure(&record)?;
        tracing::warn!(
            "{}: failed ({})",
            record.repo_name,
            record.fail_reason.as_deref().unwrap_or("unknown")
        );
    }

    tokio::time::sleep(Duration::from_millis(fetch.min_interval_ms)).await;
    Ok(record)
}
