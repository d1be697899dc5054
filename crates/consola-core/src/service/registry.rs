// ── Client registry ──
//
// One `RequestClient`, one response cache and one query cache per
// backend session, shared by a single `EntityClient` per entity kind.
// Cheaply cloneable; clones share everything.

use std::any::Any;
use std::sync::Arc;

use consola_api::{RequestClient, Session};
use dashmap::DashMap;
use futures::future::join_all;
use strum::IntoEnumIterator;
use tracing::debug;

use super::EntityClient;
use crate::cache::{ResponseCache, TtlCache};
use crate::config::ConsoleConfig;
use crate::error::DomainError;
use crate::model::{
    Aplicacao, Area, Cliente, EntityKind, Funcionalidade, Licenca, Modulo, Perfil, Resource,
    Utilizador,
};
use crate::query::{CountSummary, EntityQueries, QueryClient};
use crate::retry::RetryPolicy;

/// Per-session home of every entity client.
#[derive(Clone)]
pub struct ClientRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    http: Arc<RequestClient>,
    cache: Arc<dyn ResponseCache>,
    queries: Arc<QueryClient>,
    read_retry: RetryPolicy,
    clients: DashMap<EntityKind, Arc<dyn Any + Send + Sync>>,
}

impl ClientRegistry {
    /// Build the HTTP client and caches for `config`.
    pub fn new(config: &ConsoleConfig, session: Arc<Session>) -> Result<Self, consola_api::Error> {
        let http = RequestClient::new(
            config.base_url.as_str(),
            config.request_context(),
            session,
            &config.transport(),
        )?;
        Ok(Self::from_parts(
            Arc::new(http),
            Arc::new(TtlCache::new(config.cache_ttl)),
            Arc::new(QueryClient::new(config.query)),
            config.read_retry(),
        ))
    }

    pub fn from_parts(
        http: Arc<RequestClient>,
        cache: Arc<dyn ResponseCache>,
        queries: Arc<QueryClient>,
        read_retry: RetryPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                http,
                cache,
                queries,
                read_retry,
                clients: DashMap::new(),
            }),
        }
    }

    pub fn http(&self) -> &Arc<RequestClient> {
        &self.inner.http
    }

    pub fn session(&self) -> &Arc<Session> {
        self.inner.http.session()
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.inner.cache
    }

    pub fn query_client(&self) -> &Arc<QueryClient> {
        &self.inner.queries
    }

    /// The shared client for `E`, created on first use.
    pub fn client<E: Resource>(&self) -> Arc<EntityClient<E>> {
        let entry = Arc::clone(
            self.inner
                .clients
                .entry(E::KIND)
                .or_insert_with(|| {
                    debug!(entity = %E::KIND, "creating entity client");
                    Arc::new(self.build::<E>())
                })
                .value(),
        );
        // Only reachable if two resource types claim the same kind.
        Arc::downcast::<EntityClient<E>>(entry).unwrap_or_else(|_| Arc::new(self.build::<E>()))
    }

    pub fn queries<E: Resource>(&self) -> EntityQueries<E> {
        EntityQueries::new(self.client::<E>(), Arc::clone(&self.inner.queries))
    }

    fn build<E: Resource>(&self) -> EntityClient<E> {
        EntityClient::new(Arc::clone(&self.inner.http), Arc::clone(&self.inner.cache))
            .with_read_retry(self.inner.read_retry)
    }

    /// Total and active records of one kind.
    pub async fn count(&self, kind: EntityKind) -> Result<CountSummary, DomainError> {
        let summary = match kind {
            EntityKind::Area => self.queries::<Area>().count().await,
            EntityKind::Aplicacao => self.queries::<Aplicacao>().count().await,
            EntityKind::Modulo => self.queries::<Modulo>().count().await,
            EntityKind::Funcionalidade => self.queries::<Funcionalidade>().count().await,
            EntityKind::Licenca => self.queries::<Licenca>().count().await,
            EntityKind::Cliente => self.queries::<Cliente>().count().await,
            EntityKind::Utilizador => self.queries::<Utilizador>().count().await,
            EntityKind::Perfil => self.queries::<Perfil>().count().await,
        }?;
        Ok(*summary)
    }

    /// Counts for `kinds`, fetched concurrently. One failing kind does
    /// not hide the others.
    pub async fn summary(
        &self,
        kinds: &[EntityKind],
    ) -> Vec<(EntityKind, Result<CountSummary, DomainError>)> {
        join_all(
            kinds
                .iter()
                .map(|&kind| async move { (kind, self.count(kind).await) }),
        )
        .await
    }

    /// Counts for every kind.
    pub async fn summary_all(&self) -> Vec<(EntityKind, Result<CountSummary, DomainError>)> {
        let kinds: Vec<EntityKind> = EntityKind::iter().collect();
        self.summary(&kinds).await
    }
}
