//! Plan and run the downloads for the parsed command line.

use anyhow::{Context, Result};
use dwnldr_core::config::DwnldrConfig;
use dwnldr_core::fetch::{CurlFetcher, Fetcher};
use dwnldr_core::orchestrator::Orchestrator;
use dwnldr_core::planner;
use dwnldr_core::render::{terminal_columns, TerminalScreen};
use std::sync::Arc;

use super::Cli;

/// Returns `false` when at least one download failed.
pub async fn run_downloads(cli: &Cli, cfg: &DwnldrConfig) -> Result<bool> {
    let mut run = cli.run_config(cfg)?;
    run.layout.max_columns = terminal_columns();

    let output_dir = cli.output_dir(cfg);
    anyhow::ensure!(
        output_dir.is_dir(),
        "output directory {} does not exist",
        output_dir.display()
    );

    let tasks = planner::plan_downloads(&cli.urls, cli.output.as_deref(), &output_dir);
    for task in &tasks {
        tracing::info!(
            slot = task.slot,
            url = %task.url,
            dest = %task.output_path.display(),
            "planned"
        );
    }

    let fetcher: Arc<dyn Fetcher> = Arc::new(CurlFetcher::new(cfg.connect_timeout()));
    let orchestrator = Orchestrator::new(Arc::new(run), fetcher, TerminalScreen::new(), tasks);
    let report = orchestrator.run().await.context("download run")?;

    if !report.failed.is_empty() {
        tracing::warn!(
            failed = report.failed.len(),
            total = report.total,
            "some downloads failed"
        );
    }
    Ok(report.all_succeeded())
}
