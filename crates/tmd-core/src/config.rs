use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::ClientOptions;
use crate::pipeline::{ExecutorSettings, PipelineSettings};
use crate::posts::{PostKind, DEFAULT_API_URL};

/// Global configuration loaded from `~/.config/tmd/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdConfig {
    /// Worker threads per round.
    pub workers: usize,
    /// Rounds after the first; a task is attempted at most `retry_budget + 1` times.
    pub retry_budget: u32,
    /// Re-download files that already exist.
    pub overwrite: bool,
    /// Pause before each download, per worker, in seconds.
    pub request_delay_secs: f64,
    /// Connect timeout and stall window, in seconds.
    pub request_timeout_secs: f64,
    pub chunk_size_bytes: usize,
    /// e.g. `socks5h://127.0.0.1:1080`.
    pub proxy: Option<String>,
    /// Per-site directories are created under this root (default: current directory).
    pub save_root: Option<PathBuf>,
    /// Read API endpoint; `{site}` is replaced by the site name.
    pub api_url: String,
    /// Post kinds fetched when none are given on the command line.
    pub kinds: Vec<PostKind>,
    /// Extra request headers, e.g. `User-Agent`.
    pub headers: HashMap<String, String>,
}

impl Default for TmdConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            retry_budget: 3,
            overwrite: false,
            request_delay_secs: 0.5,
            request_timeout_secs: 3.0,
            chunk_size_bytes: 10 * 1024 * 1024,
            proxy: None,
            save_root: None,
            api_url: DEFAULT_API_URL.to_string(),
            kinds: PostKind::ALL.to_vec(),
            headers: HashMap::new(),
        }
    }
}

/// Negative, NaN and infinite values become zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl TmdConfig {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            proxy: self.proxy.clone().filter(|p| !p.trim().is_empty()),
            timeout: secs(self.request_timeout_secs),
            headers: self.headers.clone(),
            chunk_size: self.chunk_size_bytes.max(1),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            workers: self.workers.max(1),
            retry_budget: self.retry_budget,
            executor: ExecutorSettings {
                overwrite: self.overwrite,
                delay: secs(self.request_delay_secs),
            },
        }
    }

    /// TOML rendering of the effective values.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `<save_root>/<site>`, or `<cwd>/<site>` without a root. A relative
    /// `save_root` is taken relative to `cwd`.
    pub fn save_dir(&self, site: &str, cwd: &Path) -> PathBuf {
        match self.save_root.as_deref() {
            Some(root) => cwd.join(root).join(site),
            None => cwd.join(site),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tmd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TmdConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &Path) -> Result<TmdConfig> {
    if !path.exists() {
        let default_cfg = TmdConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("failed to write default config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: TmdConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
