//! `tmd fetch` – enumerate a site and download everything through the retry pipeline.

use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tmd_core::config::TmdConfig;
use tmd_core::fetch::HttpClient;
use tmd_core::pipeline::{RetryController, RunReport};
use tmd_core::posts::{self, ApiSource};
use tmd_core::storage;

pub fn run_fetch(cfg: &TmdConfig, site: &str, save_dir: &Path) -> Result<ExitCode> {
    let client = HttpClient::new(cfg.client_options());
    let source = ApiSource::new(client.clone(), &cfg.api_url, site)?;
    storage::ensure_dir(save_dir)
        .with_context(|| format!("cannot create save directory {}", save_dir.display()))?;

    tracing::info!(
        site,
        save_dir = %save_dir.display(),
        workers = cfg.workers,
        retry_budget = cfg.retry_budget,
        "fetch started"
    );
    let started = Instant::now();
    let tasks = posts::enumerate_tasks(source, &cfg.kinds, save_dir);
    let report = RetryController::new(client, cfg.pipeline_settings()).run(tasks)?;
    let elapsed = started.elapsed();

    print_summary(site, save_dir, &report, elapsed);
    tracing::info!(
        completed = report.completed(),
        skipped = report.skipped(),
        failed = report.failed.len(),
        rounds = report.rounds.len(),
        "fetch finished"
    );

    Ok(if report.mostly_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn print_summary(site: &str, save_dir: &Path, report: &RunReport, elapsed: Duration) {
    println!("{} -> {}", site, save_dir.display());
    println!(
        "  {} tasks: {} downloaded, {} already present, {} failed ({} rounds, {} attempts, {:.1}s)",
        report.enqueued,
        report.completed(),
        report.skipped(),
        report.failed.len(),
        report.rounds.len(),
        report.attempts(),
        elapsed.as_secs_f64()
    );
    for err in &report.enumeration_errors {
        println!("  enumeration error: {}", err);
    }
    if !report.failed.is_empty() {
        println!("  still failing:");
        for task in &report.failed {
            println!("    {}", task);
        }
    }
}
