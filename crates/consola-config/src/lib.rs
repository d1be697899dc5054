//! Shared configuration for the Consola CLI.
//!
//! TOML profiles, API-key resolution (env + keyring + plaintext), keyring
//! storage for session tokens, and translation to
//! `consola_core::ConsoleConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use consola_api::TlsMode;
use consola_core::ConsoleConfig;

const KEYRING_SERVICE: &str = "consola";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no API key configured for profile '{profile}'")]
    NoApiKey { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Profile name to use: the explicit one, else the configured default.
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            locale: default_locale(),
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_locale() -> String {
    consola_core::config::DEFAULT_LOCALE.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    consola_core::config::DEFAULT_PAGE_SIZE
}
fn default_cache_ttl() -> u64 {
    300
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend root URL (e.g., "https://api.example.pt").
    pub base_url: String,

    /// Tenant identifier sent with every request.
    pub tenant: String,

    /// Overrides `defaults.locale`.
    pub locale: Option<String>,

    /// Tenant API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,

    /// Login email remembered between sessions.
    pub username: Option<String>,

    /// Extra CA certificate to trust.
    pub ca_cert: Option<PathBuf>,

    pub timeout: Option<u64>,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default)]
    pub read_retries: u32,

    pub page_size: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("pt", "consola", "consola").map_or_else(
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
    p.push("consola");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path`, then `CONSOLA_*` variables
/// (`CONSOLA_DEFAULTS__PAGE_SIZE=25`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CONSOLA_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credentials ─────────────────────────────────────────────────────

fn keyring_entry(profile_name: &str, item: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/{item}"),
    )?)
}

/// Resolve the tenant API key: `api_key_env`, then keyring, then the
/// plaintext field.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(secret) = keyring_entry(profile_name, "api-key")
        .ok()
        .and_then(|e| e.get_password().ok())
    {
        return Ok(SecretString::from(secret));
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoApiKey {
        profile: profile_name.into(),
    })
}

pub fn store_api_key(profile_name: &str, key: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "api-key")?.set_password(key.expose_secret())?;
    Ok(())
}

/// Persist the session tokens so later invocations stay logged in.
pub fn store_session(
    profile_name: &str,
    token: &SecretString,
    refresh_token: Option<&SecretString>,
) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "token")?.set_password(token.expose_secret())?;
    if let Some(refresh) = refresh_token {
        keyring_entry(profile_name, "refresh-token")?.set_password(refresh.expose_secret())?;
    }
    Ok(())
}

/// Stored `(token, refresh_token)` for a profile, if logged in.
pub fn load_session(profile_name: &str) -> Option<(SecretString, Option<SecretString>)> {
    let token = keyring_entry(profile_name, "token").ok()?.get_password().ok()?;
    let refresh = keyring_entry(profile_name, "refresh-token")
        .ok()
        .and_then(|e| e.get_password().ok())
        .map(SecretString::from);
    Some((SecretString::from(token), refresh))
}

/// Forget stored tokens. Missing entries are not an error.
pub fn clear_session(profile_name: &str) -> Result<(), ConfigError> {
    for item in ["token", "refresh-token"] {
        match keyring_entry(profile_name, item)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ConsoleConfig` from a profile. The API key is optional here;
/// only login needs it.
pub fn profile_to_console_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let base_url: url::Url = profile
        .base_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {}", profile.base_url),
        })?;

    if profile.tenant.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "tenant".into(),
            reason: "must not be empty".into(),
        });
    }

    let page_size = profile.page_size.unwrap_or(defaults.page_size);
    if page_size == 0 {
        return Err(ConfigError::Validation {
            field: "page_size".into(),
            reason: "must be at least 1".into(),
        });
    }

    let mut config = ConsoleConfig::new(base_url, profile.tenant.clone());
    config.locale = profile
        .locale
        .clone()
        .unwrap_or_else(|| defaults.locale.clone());
    config.api_key = resolve_api_key(profile, profile_name).ok();
    config.tls = profile
        .ca_cert
        .clone()
        .map_or(TlsMode::System, TlsMode::CustomCa);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.cache_ttl = Duration::from_secs(profile.cache_ttl_secs);
    config.read_retries = profile.read_retries;
    config.page_size = page_size;
    Ok(config)
}
