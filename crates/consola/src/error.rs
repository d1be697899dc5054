//! CLI error types with miette diagnostics.
//!
//! Maps `DomainError` and config failures into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use consola_config::ConfigError;
use consola_core::DomainError;
use consola_core::table::state::TableError;

/// Process exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend ({entity})")]
    #[diagnostic(
        code(consola::connection_failed),
        help(
            "Check that the backend is running and the profile's base_url is right.\n\
             Try: consola config show"
        )
    )]
    ConnectionFailed {
        entity: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(consola::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    #[error("Unexpected response from the backend: {message}")]
    #[diagnostic(
        code(consola::malformed_response),
        help("The server answered without the expected envelope. Re-run with -vv for details.")
    )]
    MalformedResponse { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not signed in, or the session expired")]
    #[diagnostic(
        code(consola::auth_required),
        help("Run: consola login --profile {profile}")
    )]
    AuthRequired { profile: String },

    #[error("Role '{role}' cannot access {entity}")]
    #[diagnostic(
        code(consola::forbidden),
        help("Run: consola whoami to see the screens your role can open")
    )]
    Forbidden { role: String, entity: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(consola::no_api_key),
        help(
            "Store one with: consola config set-api-key --profile {profile}\n\
             Or set the CONSOLA_API_KEY environment variable."
        )
    )]
    NoApiKey { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{entity} '{identifier}' not found")]
    #[diagnostic(
        code(consola::not_found),
        help("Run: consola {list_command} to see available records")
    )]
    NotFound {
        entity: String,
        identifier: String,
        list_command: String,
    },

    #[error("{entity}: the backend rejected the form")]
    #[diagnostic(code(consola::invalid), help("{details}"))]
    Invalid { entity: String, details: String },

    #[error("{message}")]
    #[diagnostic(code(consola::rejected))]
    Rejected { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(consola::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(consola::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: consola config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(consola::no_config),
        help(
            "Create one with: consola config init\n\
             Expected at: {path}\n\
             Or pass --base-url and --tenant."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(consola::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(consola::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("'{command}' needs an interactive terminal")]
    #[diagnostic(
        code(consola::not_a_terminal),
        help("Use the non-interactive 'list' subcommand in scripts.")
    )]
    NotATerminal { command: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(consola::json), help("Check the JSON body and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::MalformedResponse { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthRequired { .. } | Self::NoApiKey { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Rejected {
                status: Some(409), ..
            } => exit_code::CONFLICT,
            Self::Invalid { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NotATerminal { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── DomainError → CliError mapping ───────────────────────────────────

impl From<DomainError> for CliError {
    fn from(err: DomainError) -> Self {
        let entity = err.entity();
        match err {
            DomainError::Network { source, .. } => {
                if let consola_api::Error::Network(ref e) = source {
                    if e.is_timeout() {
                        return Self::Timeout;
                    }
                }
                Self::ConnectionFailed {
                    entity: entity.plural().into(),
                    source: Box::new(source),
                }
            }
            DomainError::MalformedResponse { message, .. } => Self::MalformedResponse { message },
            DomainError::Unauthorized {
                status_code: Some(403),
                ..
            } => Self::Forbidden {
                role: "current".into(),
                entity: entity.plural().into(),
            },
            DomainError::Unauthorized { .. } => Self::AuthRequired {
                profile: "current".into(),
            },
            DomainError::Rejected {
                status_code: Some(404),
                ..
            } => Self::NotFound {
                entity: entity.label().into(),
                identifier: "(requested)".into(),
                list_command: format!("{} list", command_name(entity)),
            },
            DomainError::Rejected {
                message,
                status_code,
                ..
            } => Self::Rejected {
                status: status_code,
                message,
            },
            DomainError::Validation { message, .. } => Self::Validation {
                field: entity.to_string(),
                reason: message,
            },
            DomainError::Internal { message, .. } => Self::Rejected {
                status: None,
                message: format!("internal error: {message}"),
            },
        }
    }
}

impl From<consola_api::Error> for CliError {
    fn from(err: consola_api::Error) -> Self {
        match err {
            consola_api::Error::MissingToken | consola_api::Error::InvalidToken(_) => {
                Self::AuthRequired {
                    profile: "current".into(),
                }
            }
            consola_api::Error::Http { status, .. } if status == 401 || status == 403 => {
                Self::AuthRequired {
                    profile: "current".into(),
                }
            }
            consola_api::Error::Network(ref e) if e.is_timeout() => Self::Timeout,
            consola_api::Error::Network(_) | consola_api::Error::Tls(_) => Self::ConnectionFailed {
                entity: "account".into(),
                source: Box::new(err),
            },
            consola_api::Error::InvalidUrl(e) => Self::Validation {
                field: "base_url".into(),
                reason: e.to_string(),
            },
            other => Self::Rejected {
                status: other.status(),
                message: other
                    .messages()
                    .first()
                    .cloned()
                    .unwrap_or_else(|| other.to_string()),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoApiKey { profile } => Self::NoApiKey { profile },
            other => Self::Config(other),
        }
    }
}

impl From<TableError> for CliError {
    fn from(err: TableError) -> Self {
        Self::Validation {
            field: "table".into(),
            reason: err.to_string(),
        }
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) => Self::Io(e),
        }
    }
}

/// Subcommand that manages `kind`, for help text.
pub fn command_name(kind: consola_core::EntityKind) -> &'static str {
    use consola_core::EntityKind;

    match kind {
        EntityKind::Area => "areas",
        EntityKind::Aplicacao => "aplicacoes",
        EntityKind::Modulo => "modulos",
        EntityKind::Funcionalidade => "funcionalidades",
        EntityKind::Licenca => "licencas",
        EntityKind::Cliente => "clientes",
        EntityKind::Utilizador => "utilizadores",
        EntityKind::Perfil => "perfis",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consola_core::EntityKind;

    fn rejected(status: u16) -> DomainError {
        DomainError::Rejected {
            entity: EntityKind::Licenca,
            message: "Nome já existe".into(),
            messages: vec!["Nome já existe".into()],
            status_code: Some(status),
            source: consola_api::Error::MalformedResponse {
                message: String::new(),
            },
        }
    }

    #[test]
    fn rejected_conflict_maps_to_conflict_exit() {
        let err = CliError::from(rejected(409));
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert_eq!(err.to_string(), "Nome já existe");
    }

    #[test]
    fn rejected_not_found_points_at_list_command() {
        let err = CliError::from(rejected(404));
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "licencas list"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn forbidden_and_unauthorized_are_distinct() {
        let forbidden = CliError::from(DomainError::Unauthorized {
            entity: EntityKind::Perfil,
            status_code: Some(403),
            source: consola_api::Error::MissingToken,
        });
        assert_eq!(forbidden.exit_code(), exit_code::PERMISSION);

        let expired = CliError::from(DomainError::Unauthorized {
            entity: EntityKind::Perfil,
            status_code: None,
            source: consola_api::Error::MissingToken,
        });
        assert_eq!(expired.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn local_validation_is_a_usage_error() {
        let err = CliError::from(DomainError::Validation {
            entity: EntityKind::Area,
            message: "page must be at least 1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
