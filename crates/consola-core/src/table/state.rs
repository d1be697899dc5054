// ── Data table state machine ──
//
// `{page, page_size, filters, sorting, selection}` plus the transitions a
// list screen drives. Transitions validate against the table's columns
// and filter registry, then notify the observer.

use std::collections::BTreeSet;

use consola_api::{PaginatedRequest, PaginatedResult};
use thiserror::Error;
use tracing::debug;

use super::catalog;
use super::column::ColumnDef;
use super::filter::{FilterFieldRegistry, UrlSeed};
use crate::model::{EntityId, EntityKind};

/// One committed filter: field id and raw value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnFilter {
    pub id: String,
    pub value: String,
}

impl ColumnFilter {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// One sorted column, by column id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSort {
    pub id: String,
    pub desc: bool,
}

impl ColumnSort {
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub page: u32,
    pub page_size: u32,
    pub filters: Vec<ColumnFilter>,
    pub sorting: Vec<ColumnSort>,
    pub selection: BTreeSet<EntityId>,
}

impl TableState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            filters: Vec::new(),
            sorting: Vec::new(),
            selection: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("{kind} cannot be filtered by '{field}'")]
    UnknownFilter { kind: EntityKind, field: String },

    #[error("{kind} has no column '{column}'")]
    UnknownColumn { kind: EntityKind, column: String },

    #[error("column '{column}' of {kind} is not sortable")]
    UnsortableColumn { kind: EntityKind, column: String },

    #[error("invalid pagination: page {page}, page size {page_size}")]
    InvalidPagination { page: u32, page_size: u32 },
}

/// Callbacks fired after each committed transition.
pub trait TableObserver {
    fn on_filters_change(&mut self, _filters: &[ColumnFilter]) {}
    fn on_pagination_change(&mut self, _page: u32, _page_size: u32) {}
    fn on_sorting_change(&mut self, _sorting: &[ColumnSort]) {}
}

impl TableObserver for () {}

/// Table over one entity kind.
#[derive(Debug)]
pub struct DataTable<O: TableObserver = ()> {
    kind: EntityKind,
    columns: Vec<ColumnDef>,
    registry: FilterFieldRegistry,
    state: TableState,
    observer: O,
}

impl DataTable<()> {
    pub fn for_kind(kind: EntityKind, page_size: u32) -> Self {
        Self::new(kind, page_size, ())
    }
}

impl<O: TableObserver> DataTable<O> {
    /// Table with the stock columns and filter fields of `kind`.
    pub fn new(kind: EntityKind, page_size: u32, observer: O) -> Self {
        Self::with_columns(
            kind,
            catalog::columns(kind),
            catalog::filter_fields(kind),
            page_size,
            observer,
        )
    }

    pub fn with_columns(
        kind: EntityKind,
        columns: Vec<ColumnDef>,
        registry: FilterFieldRegistry,
        page_size: u32,
        observer: O,
    ) -> Self {
        Self {
            kind,
            columns,
            registry,
            state: TableState::new(page_size.max(1)),
            observer,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn registry(&self) -> &FilterFieldRegistry {
        &self.registry
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    // ── Filters ──────────────────────────────────────────────────────

    /// Replace the filters and go back to page 1. Blank values are
    /// dropped; a repeated field keeps its last value. Selection is
    /// left alone.
    pub fn set_filters(&mut self, filters: Vec<ColumnFilter>) -> Result<(), TableError> {
        if let Some(unknown) = filters.iter().find(|f| !self.registry.contains(&f.id)) {
            return Err(TableError::UnknownFilter {
                kind: self.kind,
                field: unknown.id.clone(),
            });
        }

        let mut committed: Vec<ColumnFilter> = Vec::with_capacity(filters.len());
        for filter in filters {
            committed.retain(|f| f.id != filter.id);
            if !filter.value.trim().is_empty() {
                committed.push(filter);
            }
        }

        debug!(entity = %self.kind, filters = committed.len(), "filters changed, page reset to 1");
        self.state.filters = committed;
        self.state.page = 1;
        self.observer.on_filters_change(&self.state.filters);
        Ok(())
    }

    /// Set one filter, keeping the others.
    pub fn set_filter(&mut self, id: &str, value: &str) -> Result<(), TableError> {
        let mut filters = self.state.filters.clone();
        filters.retain(|f| f.id != id);
        filters.push(ColumnFilter::new(id, value));
        self.set_filters(filters)
    }

    pub fn clear_filters(&mut self) {
        self.state.filters.clear();
        self.state.page = 1;
        self.observer.on_filters_change(&self.state.filters);
    }

    pub fn active_filter_count(&self) -> usize {
        self.state.filters.len()
    }

    /// Seed the initial filter from a query string. Only applies before
    /// any filter is committed and fires no callback.
    pub fn seed_from_url(&mut self, query: &str) -> Option<&ColumnFilter> {
        if !self.state.filters.is_empty() {
            return None;
        }
        let seed = UrlSeed::parse(query, &self.registry)?;
        debug!(entity = %self.kind, param = %seed.param, "filter seeded from url");
        self.state.filters.push(seed.into_filter());
        self.state.filters.first()
    }

    // ── Pagination ───────────────────────────────────────────────────

    pub fn set_pagination(&mut self, page: u32, page_size: u32) -> Result<(), TableError> {
        if page == 0 || page_size == 0 {
            return Err(TableError::InvalidPagination { page, page_size });
        }
        self.state.page = page;
        self.state.page_size = page_size;
        self.observer.on_pagination_change(page, page_size);
        Ok(())
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), TableError> {
        self.set_pagination(page, self.state.page_size)
    }

    /// Pull the current page back into `result`'s bounds, e.g. after a
    /// delete emptied the last page. Returns whether the page moved.
    pub fn reconcile<T>(&mut self, result: &PaginatedResult<T>) -> bool {
        let bounded = result.bounds_page(self.state.page);
        if bounded == self.state.page {
            return false;
        }
        debug!(entity = %self.kind, from = self.state.page, to = bounded, "page out of bounds, clamping");
        self.state.page = bounded;
        self.observer
            .on_pagination_change(bounded, self.state.page_size);
        true
    }

    // ── Sorting ──────────────────────────────────────────────────────

    pub fn set_sorting(&mut self, sorting: Vec<ColumnSort>) -> Result<(), TableError> {
        for sort in &sorting {
            self.sortable_column(&sort.id)?;
        }
        self.state.sorting = sorting;
        self.observer.on_sorting_change(&self.state.sorting);
        Ok(())
    }

    /// Header click: unsorted, ascending, descending, unsorted. Sorting
    /// is single-column, so another column's sort is replaced.
    pub fn toggle_sort(&mut self, column: &str) -> Result<(), TableError> {
        let next = match self.state.sorting.iter().find(|s| s.id == column) {
            None => vec![ColumnSort::asc(column)],
            Some(s) if !s.desc => vec![ColumnSort::desc(column)],
            Some(_) => Vec::new(),
        };
        self.set_sorting(next)
    }

    fn sortable_column(&self, id: &str) -> Result<&ColumnDef, TableError> {
        let column = self
            .columns
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| TableError::UnknownColumn {
                kind: self.kind,
                column: id.to_owned(),
            })?;
        if column.is_sortable() {
            Ok(column)
        } else {
            Err(TableError::UnsortableColumn {
                kind: self.kind,
                column: id.to_owned(),
            })
        }
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Flip one row. Returns whether it is now selected.
    pub fn toggle_row_selection(&mut self, id: &EntityId) -> bool {
        if self.state.selection.remove(id) {
            false
        } else {
            self.state.selection.insert(id.clone());
            true
        }
    }

    /// Select or deselect every row of the current page. Rows on other
    /// pages keep their state.
    pub fn toggle_all_on_page(&mut self, page_ids: &[EntityId], value: bool) {
        for id in page_ids {
            if value {
                self.state.selection.insert(id.clone());
            } else {
                self.state.selection.remove(id);
            }
        }
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.state.selection.contains(id)
    }

    pub fn selection(&self) -> Vec<EntityId> {
        self.state.selection.iter().cloned().collect()
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    // ── Request ──────────────────────────────────────────────────────

    /// The paginated request for the current state. Sorting uses each
    /// column's server sort key.
    pub fn request(&self) -> PaginatedRequest {
        let mut request = PaginatedRequest::new(self.state.page, self.state.page_size);
        for filter in &self.state.filters {
            request = request.with_filter(filter.id.clone(), filter.value.trim());
        }
        for sort in &self.state.sorting {
            let key = self
                .columns
                .iter()
                .find(|c| c.id == sort.id)
                .and_then(|c| c.sort_key)
                .unwrap_or(sort.id.as_str());
            request = request.with_sort(key, sort.desc);
        }
        request
    }
}
