//! CLI command handlers, one file per subcommand.

mod config;
mod fetch;
mod list;

pub use config::run_config;
pub use fetch::run_fetch;
pub use list::run_list;
