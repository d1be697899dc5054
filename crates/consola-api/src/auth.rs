// Session / credential provider.
//
// Holds the bearer and refresh tokens for the lifetime of a login. The
// session is an explicit object shared by `Arc`: created at startup,
// populated by login, cleared at logout. Nothing reads it ambiently.

use std::sync::RwLock;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::Error;

/// Per-deployment request headers sent with every call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Value of the `tenant` header.
    pub tenant: String,
    /// Value of the `Accept-Language` header.
    pub locale: String,
    /// `X-API-Key`, only sent on unauthenticated endpoints such as login.
    pub api_key: Option<SecretString>,
}

impl RequestContext {
    pub fn new(tenant: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            locale: locale.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }
}

/// Claims read from the JWT payload. Signatures are not verified here;
/// the backend is the authority.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(
        default,
        alias = "unique_name",
        alias = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        alias = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        alias = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role"
    )]
    pub role: RoleClaim,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// A role claim may be a single string or a list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl RoleClaim {
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::One(r) => Some(r),
            Self::Many(rs) => rs.first().map(String::as_str),
        }
    }
}

/// Bearer credential holder.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<SecretString>>,
    refresh_token: RwLock<Option<SecretString>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session from a previously persisted token pair.
    pub fn restore(token: SecretString, refresh_token: Option<SecretString>) -> Self {
        Self {
            token: RwLock::new(Some(token)),
            refresh_token: RwLock::new(refresh_token),
        }
    }

    pub fn token(&self) -> Option<SecretString> {
        self.token.read().expect("session lock poisoned").clone()
    }

    pub fn set_token(&self, token: SecretString) {
        *self.token.write().expect("session lock poisoned") = Some(token);
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.refresh_token
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    pub fn set_refresh_token(&self, token: SecretString) {
        *self.refresh_token.write().expect("session lock poisoned") = Some(token);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().expect("session lock poisoned").is_some()
    }

    /// Decode the payload segment of the current bearer token.
    pub fn decode_token(&self) -> Result<TokenClaims, Error> {
        let token = self.token().ok_or(Error::MissingToken)?;
        decode_claims(token.expose_secret())
    }

    /// Drop both tokens (logout).
    pub fn clear_auth(&self) {
        *self.token.write().expect("session lock poisoned") = None;
        *self.refresh_token.write().expect("session lock poisoned") = None;
    }
}

/// Decode the claims segment of a compact JWT without verifying it.
pub fn decode_claims(jwt: &str) -> Result<TokenClaims, Error> {
    let payload = jwt
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::InvalidToken("expected three dot-separated segments".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::InvalidToken(format!("payload is not base64url: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::InvalidToken(format!("bad claims: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn jwt(claims: &str) -> String {
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(claims))
    }

    #[test]
    fn decodes_plain_claims() {
        let claims =
            decode_claims(&jwt(r#"{"sub":"42","name":"Ana","role":"Admin","exp":10}"#)).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.role.first(), Some("Admin"));
        assert_eq!(claims.exp, Some(10));
    }

    #[test]
    fn decodes_uri_role_claim_list() {
        let claims = decode_claims(&jwt(
            r#"{"http://schemas.microsoft.com/ws/2008/06/identity/claims/role":["Gestor","Leitor"]}"#,
        ))
        .unwrap();
        assert_eq!(claims.role.first(), Some("Gestor"));
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(matches!(decode_claims("abc"), Err(Error::InvalidToken(_))));
        assert!(matches!(decode_claims("a.!!!.c"), Err(Error::InvalidToken(_))));
    }

    #[test]
    fn session_lifecycle() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(matches!(session.decode_token(), Err(Error::MissingToken)));

        session.set_token(jwt(r#"{"sub":"1"}"#).into());
        session.set_refresh_token("r".to_string().into());
        assert!(session.is_authenticated());
        assert_eq!(session.decode_token().unwrap().sub.as_deref(), Some("1"));

        session.clear_auth();
        assert!(!session.is_authenticated());
        assert!(session.refresh_token().is_none());
    }
}
