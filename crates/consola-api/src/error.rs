use thiserror::Error;

use crate::envelope::Envelope;

/// Top-level error type for the `consola-api` crate.
///
/// Covers every failure mode of the wire layer: transport, HTTP status,
/// envelope shape, and credentials. `consola-core` maps these into
/// entity-scoped domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, timeout, TLS failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing or joining failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A header value could not be encoded.
    #[error("Invalid header value for {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-success HTTP status. The raw body is kept untouched for the
    /// caller; `envelope` holds the parsed `{data, messages, succeeded}`
    /// when the body conforms to it.
    #[error("HTTP {status}: {}", summarize(.body, .envelope.as_ref()))]
    Http {
        status: u16,
        body: String,
        envelope: Option<Envelope<serde_json::Value>>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// The response parsed as JSON but does not carry the envelope shape.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Credentials ─────────────────────────────────────────────────
    /// An authenticated endpoint was called without a bearer token.
    #[error("No session token available -- log in first")]
    MissingToken,

    /// The bearer token could not be decoded.
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

fn summarize(body: &str, envelope: Option<&Envelope<serde_json::Value>>) -> String {
    if let Some(msg) = envelope.and_then(|e| e.messages.first()) {
        return msg.clone();
    }
    body.chars().take(200).collect()
}

impl Error {
    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Backend messages carried in an error envelope.
    pub fn messages(&self) -> &[String] {
        match self {
            Self::Http {
                envelope: Some(env),
                ..
            } => &env.messages,
            _ => &[],
        }
    }

    /// Returns `true` for 4xx responses whose body is an envelope, i.e.
    /// validation feedback the caller may render inline.
    pub fn is_validation_feedback(&self) -> bool {
        matches!(
            self,
            Self::Http { status, envelope: Some(_), .. } if (400..500).contains(status) && *status != 401 && *status != 403
        )
    }

    /// Returns `true` if the session is missing or was rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Http { status: 401, .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn http(status: u16, messages: &[&str]) -> Error {
        Error::Http {
            status,
            body: String::new(),
            envelope: Some(Envelope {
                data: serde_json::Value::Null,
                messages: messages.iter().map(ToString::to_string).collect(),
                succeeded: false,
            }),
        }
    }

    #[test]
    fn display_prefers_backend_message() {
        let err = http(400, &["Nome já existe"]);
        assert_eq!(err.to_string(), "HTTP 400: Nome já existe");
    }

    #[test]
    fn display_falls_back_to_body_preview() {
        let err = Error::Http {
            status: 500,
            body: "boom".into(),
            envelope: None,
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn validation_feedback_excludes_auth_statuses() {
        assert!(http(400, &["x"]).is_validation_feedback());
        assert!(http(409, &["x"]).is_validation_feedback());
        assert!(!http(401, &["x"]).is_validation_feedback());
        assert!(!http(500, &["x"]).is_validation_feedback());
    }

    #[test]
    fn transient_classification() {
        assert!(http(503, &[]).is_transient());
        assert!(!http(404, &[]).is_transient());
        assert!(!Error::MissingToken.is_transient());
    }
}
