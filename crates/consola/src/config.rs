//! Resolution of the effective backend configuration: TOML profile,
//! overridden by CLI flags and env vars, plus the stored session.
//!
//! Core never sees CLI types -- it receives a pre-built `ConsoleConfig`.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use consola_api::Session;
use consola_config::{Config, Profile};
use consola_core::{ClientRegistry, ConsoleConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use consola_config::{config_path, load_config_or_default, save_config};

/// Profile name to use: `--profile` / `CONSOLA_PROFILE`, then the config
/// default, then `"default"`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.profile_name(global.profile.as_deref()).to_owned()
}

/// Build the `ConsoleConfig` for this invocation.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<(String, ConsoleConfig), CliError> {
    let profile_name = active_profile_name(global, cfg);

    // A profile, with flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let mut profile = profile.clone();
        apply_overrides(&mut profile, global);
        let mut config =
            consola_config::profile_to_console_config(&profile, &profile_name, &cfg.defaults)?;
        if let Some(ref key) = global.api_key {
            config.api_key = Some(SecretString::from(key.clone()));
        }
        return Ok((profile_name, config));
    }

    // An explicitly requested profile that does not exist
    if global.profile.is_some() {
        return Err(profile_not_found(&profile_name, cfg));
    }

    // No profile -- build from flags / env vars alone
    let url_str = global.base_url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "base-url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;
    let tenant = global.tenant.clone().ok_or_else(|| CliError::Validation {
        field: "tenant".into(),
        reason: "required when no profile is configured".into(),
    })?;

    let mut config = ConsoleConfig::new(url, tenant);
    config.locale = global
        .locale
        .clone()
        .unwrap_or_else(|| cfg.defaults.locale.clone());
    config.api_key = global.api_key.clone().map(SecretString::from);
    config.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    config.page_size = cfg.defaults.page_size;
    Ok((profile_name, config))
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref url) = global.base_url {
        profile.base_url.clone_from(url);
    }
    if let Some(ref tenant) = global.tenant {
        profile.tenant.clone_from(tenant);
    }
    if let Some(ref locale) = global.locale {
        profile.locale = Some(locale.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}

pub fn profile_not_found(name: &str, cfg: &Config) -> CliError {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if names.is_empty() {
            "(none)".into()
        } else {
            names.join(", ")
        },
    }
}

/// Session restored from the keyring, or an anonymous one.
pub fn restore_session(profile_name: &str) -> Arc<Session> {
    let session = match consola_config::load_session(profile_name) {
        Some((token, refresh)) => Session::restore(token, refresh),
        None => Session::new(),
    };
    Arc::new(session)
}

/// Everything a backend-bound command needs.
pub struct Backend {
    pub profile: String,
    pub config: ConsoleConfig,
    pub registry: ClientRegistry,
}

pub fn connect(global: &GlobalOpts) -> Result<Backend, CliError> {
    let cfg = load_config_or_default();
    let (profile, config) = resolve(global, &cfg)?;
    let session = restore_session(&profile);
    let registry = ClientRegistry::new(&config, session)?;
    tracing::debug!(profile = %profile, base_url = %config.base_url, tenant = %config.tenant, "backend resolved");
    Ok(Backend {
        profile,
        config,
        registry,
    })
}
