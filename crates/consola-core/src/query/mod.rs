// ── Query layer ──
//
// Client-side cache of query results, keyed by entity and scope, with
// invalidation driven by mutations. Sits above the per-client response
// cache: a refetch after invalidation still goes through it, which is
// why mutations purge both.

pub mod client;
pub mod hooks;
pub mod key;
pub mod observer;

pub use client::{QueryClient, QueryOptions};
pub use hooks::{CountSummary, EntityQueries, Mutation};
pub use key::{InvalidationSet, InvalidationTarget, PageKey, QueryKey, QueryScope, ScopeKind};
pub use observer::{QueryObserver, QuerySnapshot};
