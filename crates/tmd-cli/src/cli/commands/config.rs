//! `tmd config` – show where the config lives and what is in effect.

use std::process::ExitCode;

use anyhow::Result;
use tmd_core::config::{self, TmdConfig};

pub fn run_config(cfg: &TmdConfig) -> Result<ExitCode> {
    let path = config::config_path()?;
    println!("# {}", path.display());
    print!("{}", cfg.to_toml()?);
    Ok(ExitCode::SUCCESS)
}
