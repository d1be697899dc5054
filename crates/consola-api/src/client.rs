// Typed request client
//
// Wraps `reqwest::Client` with base-URL joining, the tenant/locale header
// set, bearer credentials from the shared `Session`, and envelope
// decoding. No retry or token refresh happens here; that belongs to the
// entity-client layer.

use std::sync::Arc;

use reqwest::header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{RequestContext, Session};
use crate::envelope::{self, ApiResponse};
use crate::error::Error;
use crate::transport::TransportConfig;

/// How a request authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credential {
    /// `Authorization: Bearer <token>` from the session.
    Bearer,
    /// `X-API-Key` from the request context (login and friends).
    ApiKey,
}

/// HTTP client for the administration backend.
///
/// Every method returns a validated envelope; error statuses come back as
/// [`Error::Http`] with the body untouched.
#[derive(Debug, Clone)]
pub struct RequestClient {
    http: reqwest::Client,
    base_url: Url,
    context: RequestContext,
    session: Arc<Session>,
}

impl RequestClient {
    /// Build a client from a base URL string and transport config.
    pub fn new(
        base_url: &str,
        context: RequestContext,
        session: Arc<Session>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            context,
            session,
        })
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        context: RequestContext,
        session: Arc<Session>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            context,
            session,
        })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Join a relative path (e.g. `"api/areas"`) onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Typed verbs ──────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, Error> {
        let raw = self.send(Method::GET, path, None::<&()>, Credential::Bearer).await?;
        typed(raw)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let raw = self.send(Method::POST, path, Some(body), Credential::Bearer).await?;
        typed(raw)
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let raw = self.send(Method::PUT, path, Some(body), Credential::Bearer).await?;
        typed(raw)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, Error> {
        let raw = self
            .send(Method::DELETE, path, None::<&()>, Credential::Bearer)
            .await?;
        typed(raw)
    }

    pub async fn delete_with_body<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let raw = self
            .send(Method::DELETE, path, Some(body), Credential::Bearer)
            .await?;
        typed(raw)
    }

    /// POST to an unauthenticated endpoint using the `X-API-Key` header.
    pub async fn post_anonymous<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let raw = self.send(Method::POST, path, Some(body), Credential::ApiKey).await?;
        typed(raw)
    }

    // ── Raw verbs ────────────────────────────────────────────────────
    //
    // The body as the server sent it, before shape validation. Callers
    // run `validate_envelope` (or `decode`) themselves.

    pub async fn get_raw(&self, path: &str) -> Result<ApiResponse<Value>, Error> {
        self.send(Method::GET, path, None::<&()>, Credential::Bearer)
            .await
    }

    pub async fn post_raw<B>(&self, path: &str, body: &B) -> Result<ApiResponse<Value>, Error>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.send(Method::POST, path, Some(body), Credential::Bearer)
            .await
    }

    // ── Transport ────────────────────────────────────────────────────

    /// Issue a request and return the raw JSON body for 2xx responses.
    pub(crate) async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        credential: Credential,
    ) -> Result<ApiResponse<Value>, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        builder = self.apply_headers(builder, credential)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        trace!(status = status.as_u16(), bytes = text.len(), "response received");

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                envelope: envelope::parse_error_envelope(&text),
                body: text,
            });
        }

        let info = serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&text)),
            body: text.clone(),
        })?;
        Ok(ApiResponse {
            status: status.as_u16(),
            info,
        })
    }

    fn apply_headers(
        &self,
        builder: RequestBuilder,
        credential: Credential,
    ) -> Result<RequestBuilder, Error> {
        let builder = builder
            .header("tenant", header_value("tenant", &self.context.tenant)?)
            .header(
                ACCEPT_LANGUAGE,
                header_value("Accept-Language", &self.context.locale)?,
            )
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match credential {
            Credential::Bearer => {
                let token = self.session.token().ok_or(Error::MissingToken)?;
                let mut value =
                    header_value("Authorization", &format!("Bearer {}", token.expose_secret()))?;
                value.set_sensitive(true);
                Ok(builder.header(AUTHORIZATION, value))
            }
            Credential::ApiKey => match &self.context.api_key {
                Some(key) => {
                    let mut value = header_value("X-API-Key", key.expose_secret())?;
                    value.set_sensitive(true);
                    Ok(builder.header("X-API-Key", value))
                }
                None => Ok(builder),
            },
        }
    }
}

fn typed<T: DeserializeOwned>(raw: ApiResponse<Value>) -> Result<ApiResponse<T>, Error> {
    let status = raw.status;
    let info = envelope::decode(raw.info)?;
    Ok(ApiResponse { status, info })
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name,
        reason: e.to_string(),
    })
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
