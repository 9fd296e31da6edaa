//! CLI for the tmd media downloader.

mod commands;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tmd_core::config::{self, TmdConfig};
use tmd_core::posts::PostKind;

use commands::{run_config, run_fetch, run_list};

/// Top-level CLI for the tmd media downloader.
#[derive(Debug, Parser)]
#[command(name = "tmd")]
#[command(about = "tmd: download photo and video posts of a site", long_about = None)]
pub struct Cli {
    /// Log to stderr instead of the state-dir log file.
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Enumerate a site's posts and download every asset.
    Fetch {
        /// Site name, e.g. `liamtbyrne`.
        site: String,

        #[command(flatten)]
        opts: FetchArgs,
    },

    /// Print `destination<TAB>url` for every asset without downloading.
    List {
        /// Site name.
        site: String,

        /// Directory the destinations are resolved against (default: <save_root>/<site>).
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,

        /// Post kind to enumerate; repeat for several (default: from config).
        #[arg(long = "kind", value_name = "KIND")]
        kinds: Vec<PostKind>,
    },

    /// Show the config file path and effective values.
    Config,
}

/// Flags of `tmd fetch` that override config file values.
#[derive(Debug, Default, Args)]
pub struct FetchArgs {
    /// Save directory (default: <save_root>/<site>).
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// Proxy URL, e.g. socks5h://127.0.0.1:1080.
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Worker threads per round.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Retry rounds after the first.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Re-download files that already exist.
    #[arg(long)]
    pub overwrite: bool,

    /// Pause before each download, per worker, in seconds.
    #[arg(long, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Connect timeout and stall window, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Post kind to fetch; repeat for several (default: from config).
    #[arg(long = "kind", value_name = "KIND")]
    pub kinds: Vec<PostKind>,
}

impl FetchArgs {
    /// Overlay the flags that were given onto `cfg`.
    pub fn apply(&self, cfg: &mut TmdConfig) {
        if let Some(proxy) = &self.proxy {
            cfg.proxy = Some(proxy.clone());
        }
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
        if let Some(retries) = self.retries {
            cfg.retry_budget = retries;
        }
        if self.overwrite {
            cfg.overwrite = true;
        }
        if let Some(delay) = self.delay {
            cfg.request_delay_secs = delay;
        }
        if let Some(timeout) = self.timeout {
            cfg.request_timeout_secs = timeout;
        }
        if !self.kinds.is_empty() {
            cfg.kinds = self.kinds.clone();
        }
    }
}

/// `--save-dir` if given, else the configured per-site directory; relative
/// paths are anchored at `cwd`.
pub(crate) fn save_dir_for(cfg: &TmdConfig, site: &str, flag: Option<&Path>, cwd: &Path) -> PathBuf {
    match flag {
        Some(dir) => cwd.join(dir),
        None => cfg.save_dir(site, cwd),
    }
}

fn resolve_save_dir(cfg: &TmdConfig, site: &str, flag: Option<PathBuf>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(save_dir_for(cfg, site, flag.as_deref(), &cwd))
}

impl Cli {
    pub fn run(self) -> Result<ExitCode> {
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Fetch { site, opts } => {
                opts.apply(&mut cfg);
                let save_dir = resolve_save_dir(&cfg, &site, opts.save_dir)?;
                run_fetch(&cfg, &site, &save_dir)
            }
            CliCommand::List {
                site,
                save_dir,
                kinds,
            } => {
                if !kinds.is_empty() {
                    cfg.kinds = kinds;
                }
                let save_dir = resolve_save_dir(&cfg, &site, save_dir)?;
                run_list(&cfg, &site, &save_dir)
            }
            CliCommand::Config => run_config(&cfg),
        }
    }
}

#[cfg(test)]
mod tests;
