//! CLI for dwnldr.

mod download;

use anyhow::Result;
use clap::Parser;
use dwnldr_core::config::{self, DwnldrConfig, RunConfig};
use dwnldr_core::orchestrator::DispatchMode;
use dwnldr_core::render::DetailMode;
use dwnldr_core::units::parse_rate_cap;
use std::path::PathBuf;

use download::run_downloads;

const VERSION: &str = concat!("dwnldr v", env!("CARGO_PKG_VERSION"));

/// Download one or more files over HTTP with live per-file and total progress.
#[derive(Debug, Parser)]
#[command(name = "dwnldr", disable_version_flag = true)]
#[command(after_help = "Examples:\n  \
    dwnldr http://de.edis.at/100MB.test http://at.edis.at/100MB.test\n  \
    dwnldr -s=1M http://de.edis.at/100MB.test")]
pub struct Cli {
    /// Show version.
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Download all URLs at the same time instead of one after another.
    #[arg(short = 'p', long = "parallel")]
    pub parallel: bool,

    /// Speed limit per download in bytes/s; accepts K, M, G, T, P suffixes [default: 0 (no limit)].
    #[arg(short = 's', long = "speed", value_name = "BYTES", value_parser = parse_speed)]
    pub speed: Option<u64>,

    /// Output filename used for every URL (name-1, name-2, ... on collision).
    #[arg(short = 'o', long = "output", value_name = "NAME")]
    pub output: Option<String>,

    /// Output root directory [default: current directory].
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Show only percentage and rate per file, without bars or a live total.
    #[arg(long)]
    pub minimal: bool,

    /// URLs to download.
    #[arg(value_name = "URL", value_parser = parse_url, required_unless_present = "version")]
    pub urls: Vec<String>,
}

fn parse_speed(s: &str) -> Result<u64, String> {
    parse_rate_cap(s).map_err(|e| e.to_string())
}

/// Accepts http(s) URLs; a bare `host/path` is taken as `http://host/path`.
fn parse_url(s: &str) -> Result<String, String> {
    let candidate = if s.contains("://") {
        s.to_string()
    } else {
        format!("http://{}", s)
    };
    let parsed = url::Url::parse(&candidate).map_err(|e| format!("wrong URL {:?}: {}", s, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(candidate),
        other => Err(format!(
            "wrong URL {:?}: unsupported scheme {:?} (only http and https)",
            s, other
        )),
    }
}

impl Cli {
    /// Parses arguments, loads the config file and runs the downloads.
    /// Returns `false` when at least one download failed.
    pub async fn run_from_args() -> Result<bool> {
        let cli = Cli::parse();
        if cli.version {
            println!("Version: {}", VERSION);
            return Ok(true);
        }
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        run_downloads(&cli, &cfg).await
    }

    /// Run settings: config file values overridden by flags.
    pub fn run_config(&self, cfg: &DwnldrConfig) -> Result<RunConfig> {
        let mut run = RunConfig::from_config(cfg)?;
        if self.parallel {
            run.dispatch = DispatchMode::Parallel;
        }
        if let Some(speed) = self.speed {
            run.max_bytes_per_sec = speed;
        }
        if self.minimal {
            run.layout.detail = DetailMode::Minimal;
        }
        Ok(run)
    }

    /// Output directory: `-d`, then the config file, then the current directory.
    pub fn output_dir(&self, cfg: &DwnldrConfig) -> PathBuf {
        self.dir
            .clone()
            .or_else(|| cfg.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
