// ── Entity clients ──
//
// `EntityClient<E>` is the base client every resource shares: paginated,
// full-list, and by-id reads through the response cache, plus writes that
// never touch the cache. Resource-specific endpoints live in `extensions`.

mod extensions;
pub mod registry;

use std::marker::PhantomData;
use std::sync::Arc;

use consola_api::{ApiResponse, Envelope, PaginatedRequest, PaginatedResult, RequestClient};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::cache::{self, ResponseCache};
use crate::error::DomainError;
use crate::model::{EntityId, EntityKind, Resource, WritePolicy};
use crate::retry::RetryPolicy;

pub use registry::ClientRegistry;

/// Acknowledgement body returned by delete endpoints.
pub type Ack = ApiResponse<Envelope<Value>>;

/// Outcome of a create or update.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<T> {
    /// The backend accepted the write.
    Saved(T),
    /// The backend answered 4xx with messages meant for the form.
    Invalid { status: u16, messages: Vec<String> },
}

impl<T> Submission<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    pub fn saved(self) -> Option<T> {
        match self {
            Self::Saved(v) => Some(v),
            Self::Invalid { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Submission<U> {
        match self {
            Self::Saved(v) => Submission::Saved(f(v)),
            Self::Invalid { status, messages } => Submission::Invalid { status, messages },
        }
    }
}

/// Base client for one resource collection.
pub struct EntityClient<E: Resource> {
    http: Arc<RequestClient>,
    cache: Arc<dyn ResponseCache>,
    read_retry: RetryPolicy,
    write_retry: RetryPolicy,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Resource> Clone for EntityClient<E> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            cache: Arc::clone(&self.cache),
            read_retry: self.read_retry,
            write_retry: self.write_retry,
            _marker: PhantomData,
        }
    }
}

impl<E: Resource> EntityClient<E> {
    pub fn new(http: Arc<RequestClient>, cache: Arc<dyn ResponseCache>) -> Self {
        Self {
            http,
            cache,
            read_retry: RetryPolicy::none(),
            write_retry: RetryPolicy::none(),
            _marker: PhantomData,
        }
    }

    /// Override the retry budget for reads.
    pub fn with_read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    /// Opt writes into retries. Writes never retry unless this is set.
    pub fn with_write_retry(mut self, policy: RetryPolicy) -> Self {
        self.write_retry = policy;
        self
    }

    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    pub fn http(&self) -> &RequestClient {
        &self.http
    }

    pub fn cache(&self) -> &dyn ResponseCache {
        self.cache.as_ref()
    }

    // ── Building blocks ──────────────────────────────────────────────

    /// Composite cache key for a request, `None` if `params` cannot be
    /// serialized.
    pub fn cache_key<P: Serialize + ?Sized>(
        &self,
        method: &str,
        url: &str,
        params: &P,
    ) -> Option<String> {
        cache::cache_key(method, url, params)
    }

    /// Structural envelope check on a raw payload.
    pub fn validate_response(payload: &Value) -> bool {
        consola_api::validate_envelope(payload).is_ok()
    }

    /// Cached, retried GET of `url`.
    pub(crate) async fn cached_get<T>(&self, url: &str) -> Result<ApiResponse<T>, DomainError>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let key = self.cache_key("GET", url, &());
        cache::with_cache(self.cache.as_ref(), key, || {
            self.read_retry.run(|| self.http.get::<T>(url))
        })
        .await
        .map_err(|e| DomainError::from_api(E::KIND, e))
    }

    /// Drop every cached response under this kind's collection path.
    pub fn invalidate_cached(&self) -> usize {
        purge_kind(self.cache.as_ref(), E::KIND)
    }

    fn path(&self) -> &'static str {
        E::KIND.path()
    }

    fn item_path(&self, id: &EntityId) -> String {
        format!("{}/{id}", self.path())
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// One page of the collection, filtered and sorted server-side.
    pub async fn get_paginated(
        &self,
        request: &PaginatedRequest,
    ) -> Result<ApiResponse<PaginatedResult<E>>, DomainError> {
        if request.page_number == 0 || request.page_size == 0 {
            return Err(DomainError::Validation {
                entity: E::KIND,
                message: "page number and page size must be positive".into(),
            });
        }
        let url = format!("{}/paginated", self.path());
        let key = self.cache_key("POST", &url, request);
        cache::with_cache(self.cache.as_ref(), key, || {
            self.read_retry
                .run(|| self.http.post::<PaginatedResult<E>, _>(&url, request))
        })
        .await
        .map_err(|e| DomainError::from_api(E::KIND, e))
    }

    /// The whole collection.
    pub async fn get_all(&self) -> Result<ApiResponse<Envelope<Vec<E>>>, DomainError> {
        self.cached_get(self.path()).await
    }

    pub async fn get_by_id(&self, id: &EntityId) -> Result<ApiResponse<Envelope<E>>, DomainError> {
        self.cached_get(&self.item_path(id)).await
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn create(
        &self,
        dto: &E::Create,
    ) -> Result<Submission<ApiResponse<Envelope<EntityId>>>, DomainError> {
        let url = self.path();
        let result = self
            .write_retry
            .run(|| self.http.post::<Envelope<EntityId>, _>(url, dto))
            .await;
        self.submission(result)
    }

    pub async fn update(
        &self,
        id: &EntityId,
        dto: &E::Update,
    ) -> Result<Submission<ApiResponse<Envelope<EntityId>>>, DomainError> {
        let url = self.item_path(id);
        let result = self
            .write_retry
            .run(|| self.http.put::<Envelope<EntityId>, _>(&url, dto))
            .await;
        self.submission(result)
    }

    pub async fn delete(&self, id: &EntityId) -> Result<Ack, DomainError> {
        let url = self.item_path(id);
        self.write_retry
            .run(|| self.http.delete::<Envelope<Value>>(&url))
            .await
            .map_err(|e| DomainError::from_api(E::KIND, e))
    }

    /// Bulk delete. An empty id list succeeds without a request.
    pub async fn delete_multiple(&self, ids: &[EntityId]) -> Result<Ack, DomainError> {
        if ids.is_empty() {
            debug!(entity = %E::KIND, "delete_multiple with no ids, nothing to send");
            return Ok(ApiResponse {
                status: 200,
                info: Envelope::ok(Value::Bool(true)),
            });
        }
        let url = format!("{}/multiple", self.path());
        self.write_retry
            .run(|| self.http.delete_with_body::<Envelope<Value>, _>(&url, ids))
            .await
            .map_err(|e| DomainError::from_api(E::KIND, e))
    }

    /// Apply this kind's 4xx policy to a create/update result.
    fn submission<T>(
        &self,
        result: Result<T, consola_api::Error>,
    ) -> Result<Submission<T>, DomainError> {
        match result {
            Ok(resp) => Ok(Submission::Saved(resp)),
            Err(err)
                if E::KIND.write_policy() == WritePolicy::InlineValidation
                    && err.is_validation_feedback() =>
            {
                let status = err.status().unwrap_or(400);
                let messages = err.messages().to_vec();
                debug!(entity = %E::KIND, status, ?messages, "write rejected with validation feedback");
                Ok(Submission::Invalid { status, messages })
            }
            Err(err) => Err(DomainError::from_api(E::KIND, err)),
        }
    }
}

/// Remove every response-cache entry addressed to `kind`'s collection.
pub(crate) fn purge_kind(cache: &dyn ResponseCache, kind: EntityKind) -> usize {
    cache.remove_where(&|key| cache::key_url(key).is_some_and(|url| kind.owns_path(url)))
}
