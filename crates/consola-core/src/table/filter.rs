// ── Filter fields, filter panel, URL seeds ──

use strum::IntoEnumIterator;

use super::state::{ColumnFilter, DataTable, TableError, TableObserver};
use crate::model::EntityKind;

/// A filterable field and where it appears in the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    /// Key sent in the paginated request's `filters` map.
    pub id: &'static str,
    pub label: &'static str,
    pub order: u8,
}

impl FilterField {
    pub const fn new(id: &'static str, label: &'static str, order: u8) -> Self {
        Self { id, label, order }
    }
}

/// Ordered list of the fields a table can be filtered by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterFieldRegistry {
    fields: Vec<FilterField>,
}

impl FilterFieldRegistry {
    pub fn new(mut fields: Vec<FilterField>) -> Self {
        fields.sort_by_key(|f| f.order);
        Self { fields }
    }

    pub fn get(&self, id: &str) -> Option<&FilterField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Fields in panel order.
    pub fn iter(&self) -> impl Iterator<Item = &FilterField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ── Filter panel ─────────────────────────────────────────────────────

/// Modal filter editor. Edits stay in a draft until applied.
#[derive(Debug, Clone, Default)]
pub struct FilterPanel {
    draft: Vec<ColumnFilter>,
    open: bool,
}

impl FilterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the panel, starting the draft from the committed filters.
    pub fn open<O: TableObserver>(&mut self, table: &DataTable<O>) {
        self.draft = table.state().filters.clone();
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &[ColumnFilter] {
        &self.draft
    }

    pub fn draft_value(&self, id: &str) -> Option<&str> {
        self.draft
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.value.as_str())
    }

    /// Set (or, with an empty value, remove) one draft entry.
    pub fn set(&mut self, id: &str, value: &str) {
        self.draft.retain(|f| f.id != id);
        if !value.trim().is_empty() {
            self.draft.push(ColumnFilter::new(id, value));
        }
    }

    /// Commit the draft and close.
    pub fn apply<O: TableObserver>(&mut self, table: &mut DataTable<O>) -> Result<(), TableError> {
        table.set_filters(self.draft.clone())?;
        self.open = false;
        Ok(())
    }

    /// Empty both the draft and the committed filters, then close.
    pub fn clear<O: TableObserver>(&mut self, table: &mut DataTable<O>) {
        self.draft.clear();
        table.clear_filters();
        self.open = false;
    }

    /// Close without committing.
    pub fn cancel(&mut self) {
        self.draft.clear();
        self.open = false;
    }
}

// ── URL seed ─────────────────────────────────────────────────────────

/// An initial filter taken from a single query-string parameter such
/// as `?areaId=...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSeed {
    pub param: String,
    pub value: String,
}

impl UrlSeed {
    /// First recognised seed parameter in `query` that `registry` can
    /// filter by. Other parameters are ignored.
    pub fn parse(query: &str, registry: &FilterFieldRegistry) -> Option<Self> {
        let query = query.trim_start_matches('?');
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, v)| {
                !v.trim().is_empty()
                    && registry.contains(k)
                    && EntityKind::iter().any(|kind| kind.seed_param() == k.as_ref())
            })
            .map(|(k, v)| Self {
                param: k.into_owned(),
                value: v.into_owned(),
            })
    }

    pub fn into_filter(self) -> ColumnFilter {
        ColumnFilter {
            id: self.param,
            value: self.value,
        }
    }
}
