// ── Runtime console configuration ──
//
// Describes *which* backend to talk to and how to cache and retry. Never
// touches disk: the CLI resolves a profile and hands a `ConsoleConfig` in.

use std::time::Duration;

use consola_api::{RequestContext, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::cache::DEFAULT_TTL;
use crate::query::QueryOptions;
use crate::retry::RetryPolicy;

pub const DEFAULT_LOCALE: &str = "pt-PT";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Configuration for one backend and tenant.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Backend root, e.g. `https://api.example.pt/`.
    pub base_url: Url,
    /// Sent as the `tenant` header on every request.
    pub tenant: String,
    /// Sent as `Accept-Language`.
    pub locale: String,
    /// Tenant API key, required by login.
    pub api_key: Option<SecretString>,
    pub tls: TlsMode,
    pub timeout: Duration,
    /// Response-cache lifetime.
    pub cache_ttl: Duration,
    /// Retries for reads. Writes never retry unless asked.
    pub read_retries: u32,
    pub query: QueryOptions,
    pub page_size: u32,
}

impl ConsoleConfig {
    pub fn new(base_url: Url, tenant: impl Into<String>) -> Self {
        Self {
            base_url,
            tenant: tenant.into(),
            locale: DEFAULT_LOCALE.into(),
            api_key: None,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            cache_ttl: DEFAULT_TTL,
            read_retries: 0,
            query: QueryOptions::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn request_context(&self) -> RequestContext {
        let ctx = RequestContext::new(self.tenant.clone(), self.locale.clone());
        match &self.api_key {
            Some(key) => ctx.with_api_key(key.clone()),
            None => ctx,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }

    pub fn read_retry(&self) -> RetryPolicy {
        RetryPolicy::retries(self.read_retries)
    }
}
