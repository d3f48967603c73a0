//! Clap derive structures for the `passpoint` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// passpoint -- Passpoint (Hotspot 2.0) selection diagnostics
#[derive(Debug, Parser)]
#[command(
    name = "passpoint",
    version,
    about = "Inspect Passpoint network selection from the command line",
    long_about = "Replays scan results and ANQP responses through the Passpoint\n\
        selection engine, decodes NAI Realm payloads, and shows the ANQP\n\
        backoff schedule.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "PASSPOINT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PASSPOINT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a selection pass over a recorded scenario
    #[command(alias = "sel")]
    Select(SelectArgs),

    /// Decode and match NAI Realm payloads
    Realm(RealmArgs),

    /// Show the ANQP hold-off schedule and request element sets
    Backoff(BackoffArgs),

    /// List configured Passpoint providers
    #[command(alias = "prov")]
    Providers,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SELECT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Scenario file (JSON or YAML) with scans and ANQP responses
    pub scenario: PathBuf,

    /// Ignore providers from the config file; use only the scenario's
    #[arg(long)]
    pub scenario_providers_only: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REALM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RealmArgs {
    #[command(subcommand)]
    pub command: RealmCommand,
}

#[derive(Debug, Subcommand)]
pub enum RealmCommand {
    /// Decode a hex-encoded NAI Realm element
    Decode {
        /// Element payload as hex (whitespace and ':' ignored)
        payload: String,
    },

    /// Match a credential against a hex-encoded NAI Realm element
    Match {
        /// Element payload as hex (whitespace and ':' ignored)
        payload: String,

        /// Credential realm
        #[arg(long)]
        realm: String,

        /// Credential EAP method (name or number)
        #[arg(long, default_value = "TTLS")]
        eap: String,

        /// Non-EAP inner method for TTLS (e.g. MS-CHAP-V2)
        #[arg(long)]
        inner: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BACKOFF
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BackoffArgs {
    /// Number of consecutive unanswered attempts to show
    #[arg(long, short = 'n', default_value = "9")]
    pub attempts: u32,

    /// Include Roaming Consortium in the element list
    #[arg(long)]
    pub rc: bool,

    /// Include the Release 2 element set
    #[arg(long)]
    pub r2: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display current resolved configuration
    Show,

    /// Write a default config file if none exists
    Init,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
