//! Aggregate topic statistics over harvested records

use crate::store::ResultRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Topics listed in the top-topics section
const TOP_TOPICS_LIMIT: usize = 30;

/// Repositories included as samples
const SAMPLE_LIMIT: usize = 10;

/// Longest description kept in a sample entry
const SAMPLE_DESCRIPTION_LIMIT: usize = 100;

/// Topics shown per sample entry
const SAMPLE_TOPICS_LIMIT: usize = 5;

/// Aggregate statistics computed over the output log
#[derive(Debug, Clone, Serialize)]
pub struct TopicReport {
    pub generated_at: String,
    pub total_repositories: u64,
    pub repositories_with_topics: u64,
    pub repositories_without_topics: u64,
    pub total_topic_occurrences: u64,
    pub unique_topics: Vec<String>,
    pub unique_topics_count: u64,
    pub topic_frequency: BTreeMap<String, u64>,
    pub repositories_with_description: u64,
    pub repositories_with_readme: u64,
    pub repositories_with_both_desc_readme: u64,
    pub empty_descriptions: u64,
    pub empty_readmes: u64,
    pub avg_topics_per_repo: f64,
    pub max_topics_per_repo: u64,
    pub min_topics_per_repo: u64,
    pub repos_by_topic_count: BTreeMap<usize, u64>,
    pub top_topics: Vec<TopicCount>,
    pub sample_repositories: Vec<SampleRepository>,
}

/// One entry in the top-topics list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: u64,
}

/// Condensed view of one harvested repository
#[derive(Debug, Clone, Serialize)]
pub struct SampleRepository {
    pub repo_name: String,
    pub description: Option<String>,
    pub topics_count: usize,
    pub topics: Vec<String>,
}

/// Computes the aggregate report over harvested records
///
/// Topics are counted once per repository even if a record repeats one.
pub fn compute_report(records: &[ResultRecord]) -> TopicReport {
    let mut report = TopicReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_repositories: records.len() as u64,
        repositories_with_topics: 0,
        repositories_without_topics: 0,
        total_topic_occurrences: 0,
        unique_topics: Vec::new(),
        unique_topics_count: 0,
        topic_frequency: BTreeMap::new(),
        repositories_with_description: 0,
        repositories_with_readme: 0,
        repositories_with_both_desc_readme: 0,
        empty_descriptions: 0,
        empty_readmes: 0,
        avg_topics_per_repo: 0.0,
        max_topics_per_repo: 0,
        min_topics_per_repo: 0,
        repos_by_topic_count: BTreeMap::new(),
        top_topics: Vec::new(),
        sample_repositories: Vec::new(),
    };

    let mut topics_per_repo: Vec<usize> = Vec::new();
    let mut min_topics: Option<u64> = None;

    for record in records {
        let has_description = !is_blank(record.description.as_deref());
        let has_readme = !is_blank(record.readme_text.as_deref());

        if has_description {
            report.repositories_with_description += 1;
        } else {
            report.empty_descriptions += 1;
        }
        if has_readme {
            report.repositories_with_readme += 1;
        } else {
            report.empty_readmes += 1;
        }
        if has_description && has_readme {
            report.repositories_with_both_desc_readme += 1;
        }

        let unique: HashSet<&str> = record.topics.iter().map(String::as_str).collect();
        if unique.is_empty() {
            report.repositories_without_topics += 1;
        } else {
            report.repositories_with_topics += 1;
            let count = unique.len();
            topics_per_repo.push(count);
            *report.repos_by_topic_count.entry(count).or_insert(0) += 1;
            report.max_topics_per_repo = report.max_topics_per_repo.max(count as u64);
            min_topics = Some(min_topics.map_or(count as u64, |m| m.min(count as u64)));

            for topic in unique {
                *report.topic_frequency.entry(topic.to_string()).or_insert(0) += 1;
            }
        }

        if report.sample_repositories.len() < SAMPLE_LIMIT {
            report.sample_repositories.push(SampleRepository {
                repo_name: record.repo_name.clone(),
                description: record
                    .description
                    .as_deref()
                    .map(|d| truncate(d, SAMPLE_DESCRIPTION_LIMIT)),
                topics_count: record.topics.len(),
                topics: record
                    .topics
                    .iter()
                    .take(SAMPLE_TOPICS_LIMIT)
                    .cloned()
                    .collect(),
            });
        }
    }

    report.total_topic_occurrences = topics_per_repo.iter().map(|&c| c as u64).sum();
    report.unique_topics = report.topic_frequency.keys().cloned().collect();
    report.unique_topics_count = report.unique_topics.len() as u64;
    report.min_topics_per_repo = min_topics.unwrap_or(0);

    if !topics_per_repo.is_empty() {
        report.avg_topics_per_repo =
            report.total_topic_occurrences as f64 / topics_per_repo.len() as f64;
    }

    let mut ranked: Vec<TopicCount> = report
        .topic_frequency
        .iter()
        .map(|(topic, &count)| TopicCount {
            topic: topic.clone(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
    ranked.truncate(TOP_TOPICS_LIMIT);
    report.top_topics = ranked;

    report
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &TopicReport) {
    println!("=== Repository Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Total repositories: {}", report.total_repositories);
    println!(
        "  With topics: {} ({:.1}%)",
        report.repositories_with_topics,
        percentage(report.repositories_with_topics, report.total_repositories)
    );
    println!(
        "  Without topics: {} ({:.1}%)",
        report.repositories_without_topics,
        percentage(
            report.repositories_without_topics,
            report.total_repositories
        )
    );
    println!();

    println!("Topics:");
    println!("  Total occurrences: {}", report.total_topic_occurrences);
    println!("  Unique topics: {}", report.unique_topics_count);
    println!("  Avg per repository: {:.2}", report.avg_topics_per_repo);
    println!("  Max per repository: {}", report.max_topics_per_repo);
    println!("  Min per repository: {}", report.min_topics_per_repo);
    println!();

    println!("Content coverage:");
    println!(
        "  With description: {} ({:.1}%)",
        report.repositories_with_description,
        percentage(
            report.repositories_with_description,
            report.total_repositories
        )
    );
    println!(
        "  With README: {} ({:.1}%)",
        report.repositories_with_readme,
        percentage(report.repositories_with_readme, report.total_repositories)
    );
    println!(
        "  With both: {} ({:.1}%)",
        report.repositories_with_both_desc_readme,
        percentage(
            report.repositories_with_both_desc_readme,
            report.total_repositories
        )
    );
    println!();

    if !report.top_topics.is_empty() {
        println!("Top {} topics:", report.top_topics.len());
        for (index, entry) in report.top_topics.iter().enumerate() {
            println!(
                "  {:2}. {:<25} {:4} ({:.1}%)",
                index + 1,
                entry.topic,
                entry.count,
                percentage(entry.count, report.repositories_with_topics)
            );
        }
        println!();
    }

    if !report.repos_by_topic_count.is_empty() {
        println!("Repositories by topic count:");
        for (count, repos) in report.repos_by_topic_count.iter().take(15) {
            println!(
                "  {:2} topics: {:4} repositories ({:.1}%)",
                count,
                repos,
                percentage(*repos, report.total_repositories)
            );
        }
        println!();
    }

    if !report.sample_repositories.is_empty() {
        println!("Sample repositories:");
        for (index, sample) in report.sample_repositories.iter().enumerate() {
            println!("  {:2}. {}", index + 1, sample.repo_name);
            println!(
                "      Description: {}",
                sample.description.as_deref().unwrap_or("(none)")
            );
            println!(
                "      Topics ({}): {}",
                sample.topics_count,
                sample.topics.join(", ")
            );
        }
    }
}

fn is_blank(text: Option<&str>) -> bool {
    text.map_or(true, |t| t.trim().is_empty())
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Truncates on a character boundary, appending an ellipsis when shortened
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{}...", cut)
    }
}
