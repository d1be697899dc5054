// ── Query keys and invalidation sets ──

use consola_api::{PaginatedRequest, SortSpec};
use strum::EnumDiscriminants;

use crate::model::{EntityId, EntityKind};

/// Hashable form of a paginated request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub page: u32,
    pub page_size: u32,
    pub filters: Vec<(String, String)>,
    pub sorting: Vec<SortSpec>,
}

impl From<&PaginatedRequest> for PageKey {
    fn from(req: &PaginatedRequest) -> Self {
        Self {
            page: req.page_number,
            page_size: req.page_size,
            filters: req
                .filters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            sorting: req.sorting.clone(),
        }
    }
}

/// What a query reads, within one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumDiscriminants)]
#[strum_discriminants(name(ScopeKind), derive(Hash, PartialOrd, Ord))]
pub enum QueryScope {
    /// `[entity, page, pageSize, filters, sorting]`
    Paginated(PageKey),
    /// `[entity]`
    All,
    /// Totals derived from the full list.
    Count,
    /// Dropdown options derived from the full list.
    Select,
    ById(EntityId),
    /// Records under one parent, e.g. modules of an application.
    Related(EntityId),
}

/// Cache key for the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub entity: EntityKind,
    pub scope: QueryScope,
}

impl QueryKey {
    pub fn paginated(entity: EntityKind, request: &PaginatedRequest) -> Self {
        Self {
            entity,
            scope: QueryScope::Paginated(PageKey::from(request)),
        }
    }

    pub fn all(entity: EntityKind) -> Self {
        Self {
            entity,
            scope: QueryScope::All,
        }
    }

    pub fn count(entity: EntityKind) -> Self {
        Self {
            entity,
            scope: QueryScope::Count,
        }
    }

    pub fn select(entity: EntityKind) -> Self {
        Self {
            entity,
            scope: QueryScope::Select,
        }
    }

    pub fn by_id(entity: EntityKind, id: EntityId) -> Self {
        Self {
            entity,
            scope: QueryScope::ById(id),
        }
    }

    pub fn related(entity: EntityKind, parent_id: EntityId) -> Self {
        Self {
            entity,
            scope: QueryScope::Related(parent_id),
        }
    }

    pub fn scope_kind(&self) -> ScopeKind {
        ScopeKind::from(&self.scope)
    }
}

/// One entry of an invalidation set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvalidationTarget {
    /// Every key of `entity` in this scope (all pages, all parents).
    Scope(EntityKind, ScopeKind),
    /// Exactly one key.
    Key(QueryKey),
}

impl InvalidationTarget {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::Scope(entity, scope) => key.entity == *entity && key.scope_kind() == *scope,
            Self::Key(k) => k == key,
        }
    }
}

/// The keys a mutation declares stale on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationSet {
    targets: Vec<InvalidationTarget>,
}

/// List scopes every write to an entity invalidates.
const LIST_SCOPES: [ScopeKind; 5] = [
    ScopeKind::Paginated,
    ScopeKind::All,
    ScopeKind::Count,
    ScopeKind::Select,
    ScopeKind::Related,
];

impl InvalidationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paginated, full-list, count, select, and relationship lists of
    /// `entity`, plus the same for every related kind.
    pub fn for_write(entity: EntityKind) -> Self {
        let mut set = Self::new().lists(entity);
        for related in entity.related() {
            set = set.lists(*related);
        }
        set
    }

    /// Add the list scopes of `entity`.
    pub fn lists(mut self, entity: EntityKind) -> Self {
        for scope in LIST_SCOPES {
            self.push(InvalidationTarget::Scope(entity, scope));
        }
        self
    }

    /// Add every detail (`ById`) query of `entity`.
    pub fn details(mut self, entity: EntityKind) -> Self {
        self.push(InvalidationTarget::Scope(entity, ScopeKind::ById));
        self
    }

    /// Add a single key (e.g. the detail query of an updated record).
    pub fn key(mut self, key: QueryKey) -> Self {
        self.push(InvalidationTarget::Key(key));
        self
    }

    fn push(&mut self, target: InvalidationTarget) {
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        self.targets.iter().any(|t| t.matches(key))
    }

    /// Entity kinds touched by this set.
    pub fn entities(&self) -> Vec<EntityKind> {
        let mut kinds: Vec<EntityKind> = self
            .targets
            .iter()
            .map(|t| match t {
                InvalidationTarget::Scope(entity, _) => *entity,
                InvalidationTarget::Key(k) => k.entity,
            })
            .collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }

    pub fn targets(&self) -> &[InvalidationTarget] {
        &self.targets
    }
}
