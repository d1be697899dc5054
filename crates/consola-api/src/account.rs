// Account endpoints: login, token refresh, logout.
//
// Login is the one call that authenticates with `X-API-Key` instead of a
// bearer token. Successful responses populate the shared `Session`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::RequestClient;
use crate::envelope::Envelope;
use crate::error::Error;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    token: &'a str,
    refresh_token: &'a str,
}

/// Token pair issued by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: SecretString,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub refresh_token_expiry_time: Option<String>,
}

impl RequestClient {
    /// Authenticate and store the issued tokens in the session.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<TokenPair, Error> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let resp = self
            .post_anonymous::<Envelope<TokenPair>, _>("api/account/login", &body)
            .await?;
        let pair = resp.info.data;
        self.store(&pair);
        debug!("login succeeded");
        Ok(pair)
    }

    /// Exchange the current refresh token for a new pair.
    pub async fn refresh(&self) -> Result<TokenPair, Error> {
        let token = self.session().token().ok_or(Error::MissingToken)?;
        let refresh = self.session().refresh_token().ok_or(Error::MissingToken)?;
        let body = RefreshRequest {
            token: token.expose_secret(),
            refresh_token: refresh.expose_secret(),
        };
        let resp = self
            .post_anonymous::<Envelope<TokenPair>, _>("api/account/refresh-token", &body)
            .await?;
        let pair = resp.info.data;
        self.store(&pair);
        Ok(pair)
    }

    /// Tell the backend to revoke the session, then clear it locally.
    ///
    /// The local session is cleared even when the server call fails.
    pub async fn logout(&self) -> Result<(), Error> {
        let result = self
            .post::<Envelope<serde_json::Value>, _>("api/account/logout", &serde_json::json!({}))
            .await;
        self.session().clear_auth();
        result.map(|_| ())
    }

    fn store(&self, pair: &TokenPair) {
        self.session().set_token(pair.token.clone());
        if let Some(refresh) = &pair.refresh_token {
            self.session().set_refresh_token(refresh.clone());
        }
    }
}
