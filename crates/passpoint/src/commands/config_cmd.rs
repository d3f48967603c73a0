//! Config subcommand handlers.

use passpoint_config::{Config, ConfigError};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "<redacted>";

/// Blank out plaintext passwords before display.
fn redact(mut config: Config) -> Config {
    for profile in &mut config.providers {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    config
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = super::config_file(global);
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let config = redact(super::load_config(global)?);
            let toml = toml::to_string_pretty(&config).map_err(ConfigError::from)?;
            let out = output::render_single(
                &global.output,
                &config,
                |_| toml.trim_end().to_owned(),
                |_| path.display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            if path.exists() {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists", path.display()),
                });
            }
            passpoint_config::save_config_to(&Config::default(), &path)?;
            if !global.quiet {
                eprintln!("Wrote default config to {}", path.display());
            }
            Ok(())
        }
    }
}
