//! Shared configuration for the Passpoint tools.
//!
//! TOML settings and provider profiles, credential resolution (env +
//! keyring + plaintext), and translation into `passpoint_core` types.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use passpoint_core::anqp::{DATA_LIFETIME_MILLIS, EapType, NonEapInnerAuth};
use passpoint_core::request_manager::{BASE_HOLDOFF_TIME_MILLIS, MAX_HOLDOFF_COUNT};
use passpoint_core::{Credential, HoldOffPolicy, HomeSp, PasspointConfiguration};

const KEYRING_SERVICE: &str = "passpoint";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for provider '{fqdn}'")]
    NoCredentials { fqdn: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Output defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// ANQP scheduling and caching.
    #[serde(default)]
    pub anqp: AnqpSettings,

    /// Installed Passpoint providers.
    #[serde(default)]
    pub providers: Vec<ProviderProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnqpSettings {
    /// Hold-off after the first unanswered query, in milliseconds.
    #[serde(default = "default_holdoff_base")]
    pub holdoff_base_ms: u64,

    /// Doublings before the hold-off stops growing.
    #[serde(default = "default_max_holdoff_count")]
    pub max_holdoff_count: u32,

    /// How long ANQP answers stay cached, in milliseconds.
    #[serde(default = "default_cache_lifetime")]
    pub cache_lifetime_ms: u64,

    /// Period of the background cache sweep; 0 disables it.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for AnqpSettings {
    fn default() -> Self {
        Self {
            holdoff_base_ms: default_holdoff_base(),
            max_holdoff_count: default_max_holdoff_count(),
            cache_lifetime_ms: default_cache_lifetime(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_holdoff_base() -> u64 {
    BASE_HOLDOFF_TIME_MILLIS
}
fn default_max_holdoff_count() -> u32 {
    MAX_HOLDOFF_COUNT
}
fn default_cache_lifetime() -> u64 {
    DATA_LIFETIME_MILLIS
}
fn default_sweep_interval() -> u64 {
    300
}

impl AnqpSettings {
    pub fn holdoff_policy(&self) -> HoldOffPolicy {
        HoldOffPolicy {
            base_millis: self.holdoff_base_ms,
            max_count: self.max_holdoff_count,
        }
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.holdoff_base_ms == 0 {
            return Err(invalid("anqp.holdoff_base_ms", "must be greater than zero"));
        }
        if self.max_holdoff_count > 20 {
            return Err(invalid(
                "anqp.max_holdoff_count",
                format!("{} doublings is unreasonably long", self.max_holdoff_count),
            ));
        }
        Ok(())
    }
}

/// One installed Passpoint subscription.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderProfile {
    /// FQDN of the home service provider.
    pub fqdn: String,

    #[serde(default)]
    pub friendly_name: String,

    /// NAI realm of the credential.
    pub realm: String,

    /// EAP method name ("TTLS", "TLS", ...) or number.
    pub eap_method: String,

    /// Non-EAP inner method for TTLS ("MS-CHAP-V2", "PAP", ...).
    pub inner_method: Option<String>,

    /// Roaming consortium OIs as hex strings ("506f9a").
    #[serde(default)]
    pub roaming_consortium_ois: Vec<String>,

    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Look the password up in the system keyring.
    #[serde(default = "default_true")]
    pub keyring: bool,
}

fn default_true() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "passpoint", "passpoint").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("passpoint");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if present), then `PASSPOINT_*` variables.
///
/// Nested keys use a double underscore: `PASSPOINT_ANQP__HOLDOFF_BASE_MS`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PASSPOINT_").split("__"));

    let config: Config = figment.extract()?;
    config.anqp.validate()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a provider's password from the credential chain.
///
/// `Ok(None)` means the provider does not use a password (certificate or
/// SIM credentials). A username without any resolvable password is an
/// error.
pub fn resolve_password(profile: &ProviderProfile) -> Result<Option<SecretString>, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(Some(SecretString::from(val)));
        }
    }

    // 2. System keyring
    if profile.keyring {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{}/password", profile.fqdn)) {
            if let Ok(secret) = entry.get_password() {
                return Ok(Some(SecretString::from(secret)));
            }
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(Some(SecretString::from(pw.clone())));
    }

    if profile.username.is_some() {
        return Err(ConfigError::NoCredentials {
            fqdn: profile.fqdn.clone(),
        });
    }
    Ok(None)
}

/// Parse a roaming consortium OI written as 1 to 8 hex-encoded bytes.
pub fn parse_oi(raw: &str) -> Result<u64, ConfigError> {
    let digits = raw.trim().trim_start_matches("0x");
    if digits.is_empty() || digits.len() > 16 || digits.len() % 2 != 0 {
        return Err(invalid(
            "roaming_consortium_ois",
            format!("'{raw}' is not 1 to 8 hex bytes"),
        ));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|_| invalid("roaming_consortium_ois", format!("'{raw}' is not hex")))
}

/// Build the core provider configuration from a profile.
pub fn profile_to_configuration(profile: &ProviderProfile) -> Result<PasspointConfiguration, ConfigError> {
    if profile.fqdn.trim().is_empty() {
        return Err(invalid("fqdn", "must not be empty"));
    }
    if profile.realm.trim().is_empty() {
        return Err(invalid("realm", "must not be empty"));
    }

    let eap_type = EapType::from_name(&profile.eap_method)
        .ok_or_else(|| invalid("eap_method", format!("unknown EAP method '{}'", profile.eap_method)))?;

    let non_eap_inner_method = profile
        .inner_method
        .as_deref()
        .map(|name| {
            NonEapInnerAuth::from_str(name)
                .map_err(|_| invalid("inner_method", format!("unknown inner method '{name}'")))
        })
        .transpose()?;
    if non_eap_inner_method.is_some() && eap_type != EapType::TTLS {
        return Err(invalid("inner_method", "only valid with TTLS"));
    }

    let roaming_consortium_ois = profile
        .roaming_consortium_ois
        .iter()
        .map(|oi| parse_oi(oi))
        .collect::<Result<Vec<_>, _>>()?;

    let password = resolve_password(profile)?;

    Ok(PasspointConfiguration {
        home_sp: HomeSp {
            fqdn: profile.fqdn.clone(),
            friendly_name: profile.friendly_name.clone(),
            roaming_consortium_ois,
        },
        credential: Credential {
            realm: profile.realm.clone(),
            eap_type: Some(eap_type),
            non_eap_inner_method,
            username: profile.username.clone(),
            password,
        },
    })
}
