//! `tmd list` – enumerate only.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use tmd_core::config::TmdConfig;
use tmd_core::fetch::HttpClient;
use tmd_core::posts::{self, ApiSource};

pub fn run_list(cfg: &TmdConfig, site: &str, save_dir: &Path) -> Result<ExitCode> {
    let client = HttpClient::new(cfg.client_options());
    let source = ApiSource::new(client, &cfg.api_url, site)?;

    let mut errors = 0usize;
    for item in posts::enumerate_tasks(source, &cfg.kinds, save_dir) {
        match item {
            Ok(task) => println!("{}\t{}", task.destination().display(), task.source_url()),
            Err(e) => {
                tracing::warn!(error = %e, "enumeration failed");
                eprintln!("tmd: {}", e);
                errors += 1;
            }
        }
    }

    Ok(if errors == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
