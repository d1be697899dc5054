// ── Domain error types ──
//
// Every entity-client operation normalizes its failure into a
// `DomainError` scoped to the entity it touched. Consumers never match on
// HTTP plumbing; the original `consola_api::Error` stays reachable via
// `source()` for diagnostics.

use thiserror::Error;

use crate::model::EntityKind;

/// Entity-scoped failure of a read or write.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The server could not be reached.
    #[error("{entity}: could not reach the server")]
    Network {
        entity: EntityKind,
        #[source]
        source: consola_api::Error,
    },

    /// The server answered without the envelope shape (`data` missing).
    #[error("{entity}: unexpected response from the server: {message}")]
    MalformedResponse {
        entity: EntityKind,
        message: String,
        status_code: Option<u16>,
        #[source]
        source: consola_api::Error,
    },

    /// The session is missing, expired, or lacks permission.
    #[error("{entity}: not authorized -- log in again")]
    Unauthorized {
        entity: EntityKind,
        status_code: Option<u16>,
        #[source]
        source: consola_api::Error,
    },

    /// The server refused the operation. `message` is the first backend
    /// message when one was sent.
    #[error("{entity}: {message}")]
    Rejected {
        entity: EntityKind,
        message: String,
        messages: Vec<String>,
        status_code: Option<u16>,
        #[source]
        source: consola_api::Error,
    },

    /// Rejected locally before any request was made.
    #[error("{entity}: {message}")]
    Validation { entity: EntityKind, message: String },

    /// A bug or broken invariant inside this crate.
    #[error("{entity}: internal error: {message}")]
    Internal { entity: EntityKind, message: String },
}

impl DomainError {
    /// Classify a wire error for `entity`.
    pub fn from_api(entity: EntityKind, err: consola_api::Error) -> Self {
        use consola_api::Error as Api;

        match err {
            Api::Network(_) | Api::Tls(_) => Self::Network {
                entity,
                source: err,
            },
            Api::MalformedResponse { ref message } | Api::Deserialization { ref message, .. } => {
                Self::MalformedResponse {
                    entity,
                    message: message.clone(),
                    status_code: err.status(),
                    source: err,
                }
            }
            Api::MissingToken | Api::InvalidToken(_) => Self::Unauthorized {
                entity,
                status_code: None,
                source: err,
            },
            Api::Http { status, .. } if status == 401 || status == 403 => Self::Unauthorized {
                entity,
                status_code: Some(status),
                source: err,
            },
            Api::Http {
                status,
                ref body,
                ref envelope,
            } => {
                let messages = envelope
                    .as_ref()
                    .map(|e| e.messages.clone())
                    .unwrap_or_default();
                let message = messages.first().cloned().unwrap_or_else(|| {
                    let preview: String = body.chars().take(200).collect();
                    if preview.is_empty() {
                        format!("request failed with HTTP {status}")
                    } else {
                        format!("request failed with HTTP {status}: {preview}")
                    }
                });
                Self::Rejected {
                    entity,
                    message,
                    messages,
                    status_code: Some(status),
                    source: err,
                }
            }
            Api::InvalidUrl(_) | Api::InvalidHeader { .. } => Self::Internal {
                entity,
                message: err.to_string(),
            },
        }
    }

    pub fn entity(&self) -> EntityKind {
        match self {
            Self::Network { entity, .. }
            | Self::MalformedResponse { entity, .. }
            | Self::Unauthorized { entity, .. }
            | Self::Rejected { entity, .. }
            | Self::Validation { entity, .. }
            | Self::Internal { entity, .. } => *entity,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::MalformedResponse { status_code, .. }
            | Self::Unauthorized { status_code, .. }
            | Self::Rejected { status_code, .. } => *status_code,
            Self::Network { source, .. } => source.status(),
            Self::Validation { .. } | Self::Internal { .. } => None,
        }
    }

    /// Backend messages carried by a rejection.
    pub fn messages(&self) -> &[String] {
        match self {
            Self::Rejected { messages, .. } => messages,
            _ => &[],
        }
    }

    /// Text suitable for a toast: the backend's own message when there is
    /// one, otherwise a generic description of the failure class.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => "Não foi possível contactar o servidor.".into(),
            Self::MalformedResponse { .. } => "O servidor devolveu uma resposta inválida.".into(),
            Self::Unauthorized { .. } => "Sessão expirada ou sem permissões.".into(),
            Self::Rejected { message, .. } | Self::Validation { message, .. } => message.clone(),
            Self::Internal { .. } => "Ocorreu um erro inesperado.".into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use consola_api::Envelope;

    fn http(status: u16, messages: &[&str]) -> consola_api::Error {
        consola_api::Error::Http {
            status,
            body: "{}".into(),
            envelope: Some(Envelope {
                data: serde_json::Value::Null,
                messages: messages.iter().map(ToString::to_string).collect(),
                succeeded: false,
            }),
        }
    }

    #[test]
    fn rejection_surfaces_backend_message() {
        let err = DomainError::from_api(EntityKind::Cliente, http(400, &["Nome já existe"]));
        assert!(matches!(err, DomainError::Rejected { .. }));
        assert_eq!(err.user_message(), "Nome já existe");
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.to_string(), "cliente: Nome já existe");
    }

    #[test]
    fn rejection_without_messages_uses_status() {
        let err = DomainError::from_api(
            EntityKind::Area,
            consola_api::Error::Http {
                status: 500,
                body: String::new(),
                envelope: None,
            },
        );
        assert_eq!(err.user_message(), "request failed with HTTP 500");
    }

    #[test]
    fn auth_statuses_are_unauthorized() {
        let err = DomainError::from_api(EntityKind::Area, http(401, &[]));
        assert!(matches!(err, DomainError::Unauthorized { .. }));
        let err = DomainError::from_api(EntityKind::Area, consola_api::Error::MissingToken);
        assert!(matches!(err, DomainError::Unauthorized { .. }));
    }

    #[test]
    fn malformed_keeps_source() {
        use std::error::Error as _;
        let err = DomainError::from_api(
            EntityKind::Licenca,
            consola_api::Error::MalformedResponse {
                message: "no data".into(),
            },
        );
        assert_eq!(err.entity(), EntityKind::Licenca);
        assert!(err.source().is_some());
    }
}
