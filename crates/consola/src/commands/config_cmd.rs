//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Select};
use secrecy::SecretString;

use consola_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "locale = \"{}\"", cfg.defaults.locale);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "page_size = {}", cfg.defaults.page_size);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "base_url = \"{}\"", p.base_url);
        let _ = writeln!(out, "tenant = \"{}\"", p.tenant);
        if let Some(ref locale) = p.locale {
            let _ = writeln!(out, "locale = \"{locale}\"");
        }
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"****\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        let _ = writeln!(out, "cache_ttl_secs = {}", p.cache_ttl_secs);
        let _ = writeln!(out, "read_retries = {}", p.read_retries);
        if let Some(size) = p.page_size {
            let _ = writeln!(out, "page_size = {size}");
        }
    }

    out
}

fn save(cfg: &Config) -> Result<(), CliError> {
    let path = config::save_config(cfg)?;
    eprintln!("✓ Configuração guardada em {}", path.display());
    Ok(())
}

fn prompt_api_key() -> Result<SecretString, CliError> {
    let key = rpassword::prompt_password("API key do tenant: ")?;
    if key.trim().is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    Ok(SecretString::from(key.trim().to_owned()))
}

/// Apply `config set <key> <value>` to a profile.
fn set_profile_field(profile: &mut Profile, key: &str, value: &str) -> Result<(), CliError> {
    let invalid = |reason: String| CliError::Validation {
        field: key.into(),
        reason,
    };
    let number = |v: &str| -> Result<u64, CliError> {
        v.parse::<u64>()
            .map_err(|_| invalid(format!("expected a number, got '{v}'")))
    };

    match key {
        "base_url" => {
            url::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
            profile.base_url = value.into();
        }
        "tenant" => {
            if value.trim().is_empty() {
                return Err(invalid("must not be empty".into()));
            }
            profile.tenant = value.into();
        }
        "locale" => profile.locale = Some(value.into()),
        "username" => profile.username = Some(value.into()),
        "api_key_env" => profile.api_key_env = Some(value.into()),
        "ca_cert" => profile.ca_cert = Some(value.into()),
        "timeout" => profile.timeout = Some(number(value)?),
        "cache_ttl_secs" => profile.cache_ttl_secs = number(value)?,
        "read_retries" => {
            profile.read_retries = u32::try_from(number(value)?)
                .map_err(|_| invalid("too large".into()))?;
        }
        "page_size" => {
            let size = u32::try_from(number(value)?).map_err(|_| invalid("too large".into()))?;
            if size == 0 {
                return Err(invalid("must be at least 1".into()));
            }
            profile.page_size = Some(size);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: "unknown key (base_url, tenant, locale, username, api_key_env, \
                         ca_cert, timeout, cache_ttl_secs, read_retries, page_size)"
                    .into(),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("consola: assistente de configuração");
            eprintln!("   Ficheiro: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Nome do perfil")
                .default("default".into())
                .interact_text()?;

            let base_url: String = Input::new()
                .with_prompt("URL do backend")
                .validate_with(|s: &String| -> Result<(), String> {
                    url::Url::parse(s).map(|_| ()).map_err(|e| e.to_string())
                })
                .interact_text()?;

            let tenant: String = Input::new().with_prompt("Tenant").interact_text()?;

            let locales = ["pt-PT", "en-US"];
            let locale = Select::new()
                .with_prompt("Idioma")
                .items(&locales)
                .default(0)
                .interact()?;

            let username: String = Input::new()
                .with_prompt("Email de login (opcional)")
                .allow_empty(true)
                .interact_text()?;

            let key = prompt_api_key()?;
            let choices = [
                "Guardar no keyring do sistema (recomendado)",
                "Guardar no ficheiro de configuração (texto simples)",
            ];
            let storage = Select::new()
                .with_prompt("Onde guardar a API key?")
                .items(&choices)
                .default(0)
                .interact()?;
            let api_key = if storage == 0 {
                consola_config::store_api_key(&profile_name, &key)?;
                eprintln!("   ✓ API key guardada no keyring");
                None
            } else {
                use secrecy::ExposeSecret;
                Some(key.expose_secret().to_owned())
            };

            let profile = Profile {
                base_url,
                tenant,
                locale: locales.get(locale).map(|l| (*l).to_owned()),
                api_key,
                username: (!username.trim().is_empty()).then(|| username.trim().to_owned()),
                cache_ttl_secs: 300,
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                cfg.default_profile = Some(profile_name.clone());
            }
            cfg.profiles.insert(profile_name.clone(), profile);
            save(&cfg)?;
            eprintln!("   Próximo passo: consola login --profile {profile_name}");
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            output::print_output(format_config_redacted(&cfg).trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let name = config::active_profile_name(global, &cfg);
            let profile = cfg
                .profiles
                .entry(name)
                .or_insert_with(|| Profile {
                    cache_ttl_secs: 300,
                    ..Profile::default()
                });
            set_profile_field(profile, &key, &value)?;
            save(&cfg)
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort();
            let lines: Vec<String> = names
                .into_iter()
                .map(|n| {
                    if n == default {
                        format!("* {n}")
                    } else {
                        format!("  {n}")
                    }
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(&name, &cfg));
            }
            cfg.default_profile = Some(name);
            save(&cfg)
        }

        ConfigCommand::SetApiKey { profile } => {
            let cfg = config::load_config_or_default();
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            let key = match global.api_key {
                Some(ref k) => SecretString::from(k.clone()),
                None => prompt_api_key()?,
            };
            consola_config::store_api_key(&name, &key)?;
            eprintln!("✓ API key do perfil '{name}' guardada no keyring");
            Ok(())
        }
    }
}
