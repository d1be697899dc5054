//! Login, logout, token refresh and `whoami`.
//!
//! Tokens live in the `Session` of the registry's request client for the
//! duration of one invocation and in the system keyring between
//! invocations.

use std::io::BufRead;

use dialoguer::Input;
use secrecy::SecretString;
use serde::Serialize;

use consola_api::TokenPair;
use consola_core::Role;

use crate::cli::LoginArgs;
use crate::error::CliError;
use crate::output;

use super::App;

// ── Login / logout ──────────────────────────────────────────────────

pub async fn login(app: &App<'_>, args: &LoginArgs) -> Result<(), CliError> {
    let http = app.registry.http();
    if http.context().api_key.is_none() {
        return Err(CliError::NoApiKey {
            profile: app.profile.clone(),
        });
    }

    let email = match args.email.clone().or_else(|| remembered_username(&app.profile)) {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = read_password(args.password_stdin)?;

    let pair = http.login(email.trim(), &password).await?;
    persist(app, &pair);

    let role = app
        .role()
        .unwrap_or_else(|_| Role::Unknown(String::new()));
    if !app.global.quiet {
        let color = output::should_color(app.global.color);
        eprintln!(
            "✓ Sessão iniciada como {} ({})",
            email.trim(),
            output::role_badge(&role, color)
        );
    }
    Ok(())
}

pub async fn logout(app: &App<'_>) -> Result<(), CliError> {
    let result = if app.registry.session().is_authenticated() {
        app.registry.http().logout().await
    } else {
        Ok(())
    };
    consola_config::clear_session(&app.profile)?;

    if let Err(e) = result {
        tracing::warn!(error = %e, "server-side logout failed; local session cleared");
    }
    if !app.global.quiet {
        eprintln!("Sessão terminada");
    }
    Ok(())
}

pub async fn refresh(app: &App<'_>) -> Result<(), CliError> {
    let pair = app
        .registry
        .http()
        .refresh()
        .await
        .map_err(|_| app.auth_required())?;
    persist(app, &pair);
    if !app.global.quiet {
        eprintln!("Sessão renovada");
    }
    Ok(())
}

/// Save the new tokens. A keyring failure only costs persistence.
fn persist(app: &App<'_>, pair: &TokenPair) {
    if let Err(e) =
        consola_config::store_session(&app.profile, &pair.token, pair.refresh_token.as_ref())
    {
        tracing::warn!(error = %e, "could not store session in keyring");
        eprintln!("⚠ A sessão não foi guardada no keyring ({e}); o próximo comando pedirá login.");
    }
}

fn remembered_username(profile: &str) -> Option<String> {
    consola_config::load_config_or_default()
        .profiles
        .get(profile)
        .and_then(|p| p.username.clone())
}

fn read_password(from_stdin: bool) -> Result<SecretString, CliError> {
    let password = if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    } else {
        rpassword::prompt_password("Password: ")?
    };
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

// ── whoami ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Identity {
    profile: String,
    name: Option<String>,
    email: Option<String>,
    role: String,
    tenant: Option<String>,
    expires: Option<String>,
    menu: Vec<String>,
}

pub fn whoami(app: &App<'_>) -> Result<(), CliError> {
    let session = app.registry.session();
    if !session.is_authenticated() {
        return Err(app.auth_required());
    }
    let claims = session.decode_token().map_err(|_| app.auth_required())?;
    let role = Role::from_claims(&claims);

    let identity = Identity {
        profile: app.profile.clone(),
        name: claims.name.clone(),
        email: claims.email.clone(),
        role: role.to_string(),
        tenant: claims.tenant.clone(),
        expires: claims
            .exp
            .and_then(|exp| chrono::DateTime::from_timestamp(exp, 0))
            .map(|t| t.to_rfc3339()),
        menu: role.menu().iter().map(|k| k.plural().to_owned()).collect(),
    };

    let color = output::should_color(app.global.color);
    let out = output::render_single(
        app.global.output,
        &identity,
        |i| detail(i, &role, color),
        |i| i.email.clone().unwrap_or_default(),
    );
    output::print_output(&out, app.global.quiet);
    Ok(())
}

fn detail(identity: &Identity, role: &Role, color: bool) -> String {
    let dash = || "—".to_owned();
    let menu = if identity.menu.is_empty() {
        "(nenhum)".to_owned()
    } else {
        identity.menu.join(", ")
    };
    [
        format!("Perfil CLI: {}", identity.profile),
        format!("Nome:       {}", identity.name.clone().unwrap_or_else(dash)),
        format!("Email:      {}", identity.email.clone().unwrap_or_else(dash)),
        format!("Papel:      {}", output::role_badge(role, color)),
        format!("Tenant:     {}", identity.tenant.clone().unwrap_or_else(dash)),
        format!("Expira:     {}", identity.expires.clone().unwrap_or_else(dash)),
        format!("Menu:       {menu}"),
    ]
    .join("\n")
}
