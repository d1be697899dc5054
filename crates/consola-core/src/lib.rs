//! Data layer between `consola-api` and the console front-ends.
//!
//! - **[`EntityClient<E>`](service::EntityClient)**: per-resource CRUD and
//!   paginated reads. Reads go through the shared [`ResponseCache`] and the
//!   read [`RetryPolicy`]; writes retry only with an explicit budget.
//!
//! - **[`ClientRegistry`]**: one long-lived client per entity kind, all
//!   sharing one HTTP client, one response cache and one [`QueryClient`].
//!
//! - **Query layer** ([`query`]): results keyed by entity and scope with
//!   soft staleness, hard eviction, in-flight coalescing and placeholder
//!   data. Mutations declare the [`InvalidationSet`] they make stale.
//!
//! - **Data table** ([`table`]): the `{page, pageSize, filters, sorting,
//!   selection}` state machine that list screens drive.
//!
//! - **Domain model** ([`model`]) and the closed [`Role`] set.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod retry;
pub mod roles;
pub mod service;
pub mod table;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{ResponseCache, TtlCache, cache_key};
pub use config::ConsoleConfig;
pub use error::DomainError;
pub use query::{
    CountSummary, EntityQueries, InvalidationSet, Mutation, QueryClient, QueryKey, QueryObserver,
    QueryOptions,
};
pub use retry::RetryPolicy;
pub use roles::{Role, RoleColor};
pub use service::{ClientRegistry, EntityClient, Submission};
pub use table::{ColumnDef, DataTable, FilterPanel, TableObserver};

pub use model::{
    Aplicacao, AplicacaoInput, ApiKeyIssued, Area, AreaInput, Cliente, ClienteInput, EntityId,
    EntityKind, Funcionalidade, FuncionalidadeInput, Licenca, LicencaInput, Modulo, ModuloInput,
    Perfil, PerfilInput, Resource, SelectOption, Utilizador, UtilizadorInput, WritePolicy,
};
