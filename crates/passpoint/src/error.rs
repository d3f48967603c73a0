//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable
//! help text.

use miette::Diagnostic;
use thiserror::Error;

use passpoint_config::ConfigError;
use passpoint_core::{CoreError, ProtocolError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const PROTOCOL: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(passpoint::validation))]
    Validation { field: String, reason: String },

    #[error("Payload is not valid hex")]
    #[diagnostic(
        code(passpoint::hex),
        help("Pass the element body as hex digits, e.g. 0100140000...")
    )]
    Hex(#[from] hex::FromHexError),

    #[error("Could not read scenario {path}")]
    #[diagnostic(
        code(passpoint::scenario),
        help("Scenarios are JSON (.json) or YAML (.yaml/.yml) files with `scans` and `anqp` lists.")
    )]
    Scenario {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── ANQP ─────────────────────────────────────────────────────────

    #[error("Malformed NAI Realm payload")]
    #[diagnostic(code(passpoint::malformed_realm))]
    MalformedRealm(#[source] ProtocolError),

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(passpoint::config),
        help("Check the config file with: passpoint config show")
    )]
    Config(#[from] ConfigError),

    // ── Engine ───────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(passpoint::core))]
    Core(CoreError),

    // ── Output / IO ──────────────────────────────────────────────────

    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::Hex(_) | Self::Scenario { .. } => exit_code::USAGE,
            Self::Config(_) => exit_code::CONFIG,
            Self::MalformedRealm(_) => exit_code::PROTOCOL,
            Self::Core(_) | Self::Json(_) | Self::Yaml(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            other => CliError::Core(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        let protocol = CliError::MalformedRealm(ProtocolError::Runt {
            remaining: 1,
            required: 5,
        });
        assert_eq!(protocol.exit_code(), exit_code::PROTOCOL);
        assert_eq!(
            CliError::from(CoreError::ServiceStopped).exit_code(),
            exit_code::GENERAL
        );
        assert_eq!(
            CliError::from(CoreError::Config {
                message: "bad".into()
            })
            .exit_code(),
            exit_code::USAGE
        );
    }
}
