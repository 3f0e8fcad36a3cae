use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::DEFAULT_CALLBACK_INTERVAL;
use crate::orchestrator::DispatchMode;
use crate::render::{DetailMode, Layout, DEFAULT_BAR_WIDTH};
use crate::units::parse_rate_cap;

/// Defaults loaded from `~/.config/dwnldr/config.toml`. Command-line flags win.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DwnldrConfig {
    /// Per-task rate cap as a magnitude string (e.g. "512K"); None = unlimited.
    pub max_bytes_per_sec: Option<String>,
    /// Start every download at once instead of one after another.
    pub parallel: bool,
    /// Directory downloads are written to; None = current directory.
    pub output_dir: Option<PathBuf>,
    /// Minimum milliseconds between progress updates from one transfer.
    pub callback_interval_ms: u64,
    /// Width of the progress bars in columns.
    pub bar_width: usize,
    /// "full" (bars + aggregate row) or "minimal".
    pub detail: DetailMode,
    /// libcurl connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for DwnldrConfig {
    fn default() -> Self {
        Self {
            max_bytes_per_sec: None,
            parallel: false,
            output_dir: None,
            callback_interval_ms: DEFAULT_CALLBACK_INTERVAL.as_millis() as u64,
            bar_width: DEFAULT_BAR_WIDTH,
            detail: DetailMode::Full,
            connect_timeout_secs: 30,
        }
    }
}

impl DwnldrConfig {
    /// Rate cap from the config file in bytes/sec (0 when unset).
    pub fn rate_cap(&self) -> Result<u64> {
        match self.max_bytes_per_sec.as_deref() {
            None => Ok(0),
            Some(raw) => parse_rate_cap(raw)
                .with_context(|| format!("config max_bytes_per_sec = {:?}", raw)),
        }
    }

    pub fn callback_interval(&self) -> Duration {
        Duration::from_millis(self.callback_interval_ms.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

/// Settings for one run, fixed before the first task is dispatched and shared
/// by the orchestrator and every task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub dispatch: DispatchMode,
    /// Per-task receive ceiling in bytes/sec (0 = unlimited).
    pub max_bytes_per_sec: u64,
    pub callback_interval: Duration,
    pub layout: Layout,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::Sequential,
            max_bytes_per_sec: 0,
            callback_interval: DEFAULT_CALLBACK_INTERVAL,
            layout: Layout::default(),
        }
    }
}

impl RunConfig {
    /// Run settings taken from the config file alone.
    pub fn from_config(cfg: &DwnldrConfig) -> Result<Self> {
        Ok(Self {
            dispatch: if cfg.parallel {
                DispatchMode::Parallel
            } else {
                DispatchMode::Sequential
            },
            max_bytes_per_sec: cfg.rate_cap()?,
            callback_interval: cfg.callback_interval(),
            layout: Layout {
                bar_width: cfg.bar_width,
                detail: cfg.detail,
                max_columns: None,
            },
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dwnldr")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DwnldrConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DwnldrConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: DwnldrConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = DwnldrConfig::default();
        assert!(!cfg.parallel);
        assert_eq!(cfg.callback_interval_ms, 200);
        assert_eq!(cfg.bar_width, 28);
        assert_eq!(cfg.detail, DetailMode::Full);
        assert_eq!(cfg.rate_cap().unwrap(), 0);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = DwnldrConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DwnldrConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.callback_interval_ms, cfg.callback_interval_ms);
        assert_eq!(parsed.bar_width, cfg.bar_width);
        assert_eq!(parsed.detail, cfg.detail);
        assert_eq!(parsed.connect_timeout_secs, cfg.connect_timeout_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            max_bytes_per_sec = "512K"
            parallel = true
            output_dir = "/srv/mirror"
            bar_width = 40
            detail = "minimal"
        "#;
        let cfg: DwnldrConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.rate_cap().unwrap(), 512 * 1024);
        assert!(cfg.parallel);
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/srv/mirror")));
        assert_eq!(cfg.bar_width, 40);
        assert_eq!(cfg.detail, DetailMode::Minimal);
        // Unset keys keep their defaults.
        assert_eq!(cfg.callback_interval_ms, 200);
    }

    #[test]
    fn bad_rate_in_config_is_an_error() {
        let cfg: DwnldrConfig = toml::from_str(r#"max_bytes_per_sec = "fast""#).unwrap();
        assert!(cfg.rate_cap().is_err());
    }

    #[test]
    fn run_config_from_file_values() {
        let cfg: DwnldrConfig =
            toml::from_str("parallel = true\ncallback_interval_ms = 100").unwrap();
        let run = RunConfig::from_config(&cfg).unwrap();
        assert_eq!(run.dispatch, DispatchMode::Parallel);
        assert_eq!(run.callback_interval, Duration::from_millis(100));
        assert_eq!(run.layout.bar_width, DEFAULT_BAR_WIDTH);
    }
}
