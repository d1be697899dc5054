// ── Query observer ──
//
// Tracks one "mounted" query whose key changes over time (page, filters,
// sorting). While a new key loads, the last successful result stays
// visible and is flagged as placeholder data. Results for keys that are
// no longer observed are dropped.

use std::sync::Arc;

use super::key::QueryKey;
use crate::error::DomainError;

/// Point-in-time view of an observed query.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    pub data: Option<Arc<T>>,
    /// `data` belongs to a previous key.
    pub is_placeholder_data: bool,
    pub is_fetching: bool,
    pub error: Option<Arc<DomainError>>,
}

impl<T> QuerySnapshot<T> {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.is_fetching
    }
}

/// Observer for one logical query slot.
#[derive(Debug)]
pub struct QueryObserver<T> {
    key: Option<QueryKey>,
    data: Option<Arc<T>>,
    data_key: Option<QueryKey>,
    fetching: bool,
    error: Option<Arc<DomainError>>,
}

impl<T> Default for QueryObserver<T> {
    fn default() -> Self {
        Self {
            key: None,
            data: None,
            data_key: None,
            fetching: false,
            error: None,
        }
    }
}

impl<T> QueryObserver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    /// Start observing `key`. Previous data stays visible.
    pub fn observe(&mut self, key: QueryKey) {
        if self.key.as_ref() != Some(&key) {
            self.error = None;
        }
        self.key = Some(key);
        self.fetching = true;
    }

    /// Deliver a fetch result. Returns `false` (and discards the result)
    /// if `key` is no longer the observed key.
    pub fn settle(&mut self, key: &QueryKey, result: Result<Arc<T>, DomainError>) -> bool {
        if self.key.as_ref() != Some(key) {
            return false;
        }
        self.fetching = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.data_key = Some(key.clone());
                self.error = None;
            }
            Err(err) => self.error = Some(Arc::new(err)),
        }
        true
    }

    pub fn snapshot(&self) -> QuerySnapshot<T> {
        QuerySnapshot {
            data: self.data.clone(),
            is_placeholder_data: self.data.is_some() && self.data_key != self.key,
            is_fetching: self.fetching,
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use consola_api::PaginatedRequest;

    fn page(n: u32) -> QueryKey {
        QueryKey::paginated(EntityKind::Cliente, &PaginatedRequest::new(n, 10))
    }

    #[test]
    fn previous_page_stays_visible_while_next_loads() {
        let mut obs = QueryObserver::new();
        obs.observe(page(1));
        assert!(obs.snapshot().is_loading());
        obs.settle(&page(1), Ok(Arc::new("page one")));

        obs.observe(page(2));
        let snap = obs.snapshot();
        assert_eq!(*snap.data.unwrap(), "page one");
        assert!(snap.is_placeholder_data);
        assert!(snap.is_fetching);

        obs.settle(&page(2), Ok(Arc::new("page two")));
        let snap = obs.snapshot();
        assert_eq!(*snap.data.unwrap(), "page two");
        assert!(!snap.is_placeholder_data);
    }

    #[test]
    fn abandoned_results_are_discarded() {
        let mut obs = QueryObserver::new();
        obs.observe(page(1));
        obs.observe(page(2));
        assert!(!obs.settle(&page(1), Ok(Arc::new(1))));
        assert!(obs.snapshot().data.is_none());
    }

    #[test]
    fn errors_keep_last_data() {
        let mut obs = QueryObserver::new();
        obs.observe(page(1));
        obs.settle(&page(1), Ok(Arc::new(1)));
        obs.observe(page(2));
        obs.settle(
            &page(2),
            Err(DomainError::Validation {
                entity: EntityKind::Cliente,
                message: "x".into(),
            }),
        );
        let snap = obs.snapshot();
        assert!(snap.is_error());
        assert_eq!(*snap.data.unwrap(), 1);
        assert!(snap.is_placeholder_data);
    }
}
