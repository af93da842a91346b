//! Repo-Harvest main entry point
//!
//! Command-line interface for the repository metadata harvester.

use anyhow::Context;
use clap::Parser;
use repo_harvest::config::{load_config_with_hash, Config};
use repo_harvest::store::SuccessEntry;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Repo-Harvest: a resumable repository metadata harvester
///
/// Fetches description, topics, and README text for every repository in a
/// ranking file, retrying failures in rounds and resuming across restarts.
#[derive(Parser, Debug)]
#[command(name = "repo-harvest")]
#[command(version)]
#[command(about = "Harvests repository metadata for a ranked list", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard all previous progress before harvesting
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_report"])]
    fresh: bool,

    /// Validate config and show the pending work without fetching
    #[arg(long, conflicts_with_all = ["stats", "export_report"])]
    dry_run: bool,

    /// Print statistics from the output log and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_report"])]
    stats: bool,

    /// Write the JSON topic report from the output log and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_report {
        handle_export_report(&config)?;
    } else {
        handle_harvest(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("repo_harvest=info,warn"),
            1 => EnvFilter::new("repo_harvest=debug,info"),
            2 => EnvFilter::new("repo_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows pending work
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Repo-Harvest Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!(
        "  Token: {}",
        if config.api.token.is_empty() {
            "(none, unauthenticated)"
        } else {
            "(set)"
        }
    );
    println!("  Request timeout: {}s", config.api.request_timeout_secs);

    println!("\nFetch:");
    println!("  Workers: {}", config.fetch.max_workers);
    println!("  Retry limit: {}", config.fetch.retry_limit);
    println!("  Min interval: {}ms", config.fetch.min_interval_ms);
    println!("  Round cooldown: {}s", config.fetch.round_cooldown_secs);
    println!(
        "  Max rounds: {}",
        if config.fetch.max_rounds == 0 {
            "unlimited".to_string()
        } else {
            config.fetch.max_rounds.to_string()
        }
    );

    println!("\nOutput:");
    println!("  Output log: {}", config.output.output_path);
    println!("  Success index: {}", config.output.success_index_path);
    println!("  Failed index: {}", config.output.failed_index_path);
    println!("  Report: {}", config.output.report_path);

    let rows = repo_harvest::input::load_ranking(Path::new(&config.input.ranking_path))?;
    let succeeded: Vec<SuccessEntry> =
        repo_harvest::store::load_records(Path::new(&config.output.success_index_path))?;
    let succeeded_ids: std::collections::HashSet<&str> =
        succeeded.iter().map(|e| e.repo_id.as_str()).collect();
    let pending = rows
        .iter()
        .filter(|row| !succeeded_ids.contains(row.repo_id.as_str()))
        .count();

    println!("\nRanking: {} ({} rows)", config.input.ranking_path, rows.len());
    println!("Already succeeded: {}", succeeded_ids.len());
    println!("Pending: {}", pending);

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: prints statistics from the output log
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let records = repo_harvest::report::load_harvested(Path::new(&config.output.output_path))?;
    let report = repo_harvest::report::compute_report(&records);
    repo_harvest::report::print_report(&report);
    Ok(())
}

/// Handles the --export-report mode: writes the JSON topic report
fn handle_export_report(config: &Config) -> anyhow::Result<()> {
    let report = repo_harvest::report::export_report(
        Path::new(&config.output.output_path),
        Path::new(&config.output.report_path),
    )?;
    repo_harvest::report::print_report(&report);
    println!("\n✓ Report exported to: {}", config.output.report_path);
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh harvest (discarding previous progress)");
        for path in [
            &config.output.output_path,
            &config.output.success_index_path,
            &config.output.failed_index_path,
        ] {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::debug!("Removed {}", path),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err).with_context(|| format!("removing {}", path)),
            }
        }
    } else {
        tracing::info!("Starting harvest (resuming previous progress if any)");
    }

    let summary = repo_harvest::run_harvest(config).await?;

    tracing::info!(
        "Harvest finished: {} initially pending, {} rounds, {} still failing",
        summary.initial_pending,
        summary.rounds,
        summary.remaining_failures
    );

    Ok(())
}
