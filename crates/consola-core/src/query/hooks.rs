// ── Per-entity queries and mutations ──
//
// Binds an `EntityClient` to the shared `QueryClient`: every read has a
// query key, every write declares the keys it makes stale.

use std::sync::Arc;

use consola_api::{PaginatedRequest, PaginatedResult};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use super::client::QueryClient;
use super::key::{InvalidationSet, QueryKey};
use crate::error::DomainError;
use crate::model::{ApiKeyIssued, Cliente, EntityId, Licenca, Resource, SelectOption};
use crate::service::{self, EntityClient, Submission};

/// Totals derived from the full list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountSummary {
    pub total: usize,
    pub active: usize,
}

/// A write, as far as invalidation is concerned.
#[derive(Debug, Clone, Copy)]
pub enum Mutation<'a> {
    Create,
    Update(&'a EntityId),
    Delete(&'a EntityId),
    DeleteMultiple,
}

/// Query and mutation bindings for one resource.
pub struct EntityQueries<E: Resource> {
    client: Arc<EntityClient<E>>,
    queries: Arc<QueryClient>,
}

impl<E: Resource> Clone for EntityQueries<E> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            queries: Arc::clone(&self.queries),
        }
    }
}

impl<E: Resource> EntityQueries<E> {
    pub fn new(client: Arc<EntityClient<E>>, queries: Arc<QueryClient>) -> Self {
        Self { client, queries }
    }

    pub fn client(&self) -> &Arc<EntityClient<E>> {
        &self.client
    }

    pub fn query_client(&self) -> &Arc<QueryClient> {
        &self.queries
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn paginated(
        &self,
        request: &PaginatedRequest,
    ) -> Result<Arc<PaginatedResult<E>>, DomainError> {
        let client = &self.client;
        self.queries
            .fetch(QueryKey::paginated(E::KIND, request), || async move {
                client.get_paginated(request).await.map(|r| r.info)
            })
            .await
    }

    pub async fn all(&self) -> Result<Arc<Vec<E>>, DomainError> {
        let client = &self.client;
        self.queries
            .fetch(QueryKey::all(E::KIND), || async move {
                client.get_all().await.map(|r| r.info.data)
            })
            .await
    }

    pub async fn by_id(&self, id: &EntityId) -> Result<Arc<E>, DomainError> {
        let client = &self.client;
        self.queries
            .fetch(QueryKey::by_id(E::KIND, id.clone()), || async move {
                client.get_by_id(id).await.map(|r| r.info.data)
            })
            .await
    }

    /// Records under one parent (modules of an application, ...).
    pub async fn related(&self, parent_id: &EntityId) -> Result<Arc<Vec<E>>, DomainError> {
        let client = &self.client;
        self.queries
            .fetch(QueryKey::related(E::KIND, parent_id.clone()), || async move {
                client.get_by_parent(parent_id).await.map(|r| r.info.data)
            })
            .await
    }

    /// Total and active counts, derived from the full list.
    pub async fn count(&self) -> Result<Arc<CountSummary>, DomainError> {
        self.queries
            .fetch(QueryKey::count(E::KIND), || async {
                let all = self.all().await?;
                Ok(CountSummary {
                    total: all.len(),
                    active: all.iter().filter(|e| e.is_active()).count(),
                })
            })
            .await
    }

    /// Active records as dropdown options, sorted by name.
    pub async fn select_options(&self) -> Result<Arc<Vec<SelectOption>>, DomainError> {
        self.queries
            .fetch(QueryKey::select(E::KIND), || async {
                let all = self.all().await?;
                let mut options: Vec<SelectOption> = all
                    .iter()
                    .filter(|e| e.is_active())
                    .map(|e| SelectOption {
                        value: e.id().clone(),
                        label: e.name().to_owned(),
                    })
                    .collect();
                options.sort_by_cached_key(|o| o.label.to_lowercase());
                Ok(options)
            })
            .await
    }

    /// Warm `page - 1` and `page + 1` in the background.
    ///
    /// `total_pages`, when known, bounds the next page. Failures are
    /// logged and dropped.
    pub fn prefetch_adjacent(
        &self,
        request: &PaginatedRequest,
        total_pages: Option<u32>,
    ) -> Vec<JoinHandle<()>> {
        let page = request.page_number;
        let mut pages = Vec::with_capacity(2);
        if page > 1 {
            pages.push(page - 1);
        }
        if total_pages.is_none_or(|total| page < total) {
            pages.push(page + 1);
        }

        pages
            .into_iter()
            .map(|p| {
                let this = self.clone();
                let req = request.at_page(p);
                tokio::spawn(async move {
                    let key = QueryKey::paginated(E::KIND, &req);
                    let client = &this.client;
                    this.queries
                        .prefetch(key, || async {
                            client.get_paginated(&req).await.map(|r| r.info)
                        })
                        .await;
                })
            })
            .collect()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Keys a successful `mutation` marks stale.
    pub fn invalidation_set(mutation: Mutation<'_>) -> InvalidationSet {
        let base = InvalidationSet::for_write(E::KIND);
        match mutation {
            Mutation::Create => base,
            Mutation::Update(id) | Mutation::Delete(id) => {
                base.key(QueryKey::by_id(E::KIND, id.clone()))
            }
            Mutation::DeleteMultiple => base.details(E::KIND),
        }
    }

    pub async fn create(&self, dto: &E::Create) -> Result<Submission<EntityId>, DomainError> {
        let outcome = self.client.create(dto).await?;
        if outcome.is_saved() {
            self.invalidate(&Self::invalidation_set(Mutation::Create));
        }
        Ok(outcome.map(|r| r.info.data))
    }

    pub async fn update(
        &self,
        id: &EntityId,
        dto: &E::Update,
    ) -> Result<Submission<EntityId>, DomainError> {
        let outcome = self.client.update(id, dto).await?;
        if outcome.is_saved() {
            self.invalidate(&Self::invalidation_set(Mutation::Update(id)));
        }
        Ok(outcome.map(|r| r.info.data))
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), DomainError> {
        self.client.delete(id).await?;
        self.invalidate(&Self::invalidation_set(Mutation::Delete(id)));
        Ok(())
    }

    /// Bulk delete. An empty list still succeeds and still invalidates.
    pub async fn delete_multiple(&self, ids: &[EntityId]) -> Result<(), DomainError> {
        self.client.delete_multiple(ids).await?;
        self.invalidate(&Self::invalidation_set(Mutation::DeleteMultiple));
        Ok(())
    }

    /// Mark `set` stale in the query cache and drop the matching
    /// response-cache entries so the refetch reaches the server.
    pub fn invalidate(&self, set: &InvalidationSet) {
        let touched = self.queries.invalidate(set);
        for kind in set.entities() {
            let purged = service::purge_kind(self.client.cache(), kind);
            debug!(entity = %kind, purged, "purged response cache");
        }
        debug!(entity = %E::KIND, queries = touched.len(), "mutation invalidated queries");
    }
}

// ── Resource-specific mutations ──────────────────────────────────────

impl EntityQueries<Licenca> {
    fn license_changed(&self, id: &EntityId) {
        self.invalidate(&Self::invalidation_set(Mutation::Update(id)));
    }

    pub async fn block(&self, id: &EntityId, motivo: &str) -> Result<(), DomainError> {
        self.client.block(id, motivo).await?;
        self.license_changed(id);
        Ok(())
    }

    pub async fn unblock(&self, id: &EntityId) -> Result<(), DomainError> {
        self.client.unblock(id).await?;
        self.license_changed(id);
        Ok(())
    }

    pub async fn add_utilizador(
        &self,
        id: &EntityId,
        utilizador_id: &EntityId,
    ) -> Result<(), DomainError> {
        self.client.add_utilizador(id, utilizador_id).await?;
        self.license_changed(id);
        Ok(())
    }

    pub async fn remove_utilizador(
        &self,
        id: &EntityId,
        utilizador_id: &EntityId,
    ) -> Result<(), DomainError> {
        self.client.remove_utilizador(id, utilizador_id).await?;
        self.license_changed(id);
        Ok(())
    }
}

impl EntityQueries<Cliente> {
    /// Issue a key. The plaintext is only ever returned here.
    pub async fn issue_api_key(&self, id: &EntityId) -> Result<ApiKeyIssued, DomainError> {
        let issued = self.client.issue_api_key(id).await?;
        self.invalidate(&Self::invalidation_set(Mutation::Update(id)));
        Ok(issued.info.data)
    }

    pub async fn rotate_api_key(&self, id: &EntityId) -> Result<ApiKeyIssued, DomainError> {
        let issued = self.client.rotate_api_key(id).await?;
        self.invalidate(&Self::invalidation_set(Mutation::Update(id)));
        Ok(issued.info.data)
    }
}
