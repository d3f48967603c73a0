//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod backoff;
pub mod config_cmd;
pub mod providers;
pub mod realm;
pub mod select;

use std::path::PathBuf;

use passpoint_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Select(args) => select::handle(&args, global).await,
        Command::Realm(args) => realm::handle(args, global),
        Command::Backoff(args) => backoff::handle(&args, global),
        Command::Providers => providers::handle(global),
        Command::Config(args) => config_cmd::handle(&args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = crate::cli::Cli::command();
            generate(args.shell, &mut cmd, "passpoint", &mut std::io::stdout());
            Ok(())
        }
    }
}

// ── Shared helpers ───────────────────────────────────────────────────

/// Config file in effect: `--config` / `PASSPOINT_CONFIG`, else the
/// platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(passpoint_config::config_path)
}

pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(passpoint_config::load_config_from(&config_file(global))?)
}
