// ── Domain model ──
//
// Wire DTOs for every managed resource, plus the `Resource` trait the
// generic entity client and query layer are written against.

pub mod catalog;
pub mod entity_id;
pub mod identity;
pub mod kind;
pub mod licensing;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use catalog::{Aplicacao, AplicacaoInput, Area, AreaInput, Funcionalidade, FuncionalidadeInput, Modulo, ModuloInput};
pub use entity_id::EntityId;
pub use identity::{Perfil, PerfilInput, Utilizador, UtilizadorInput};
pub use kind::{EntityKind, WritePolicy};
pub use licensing::{ApiKeyIssued, BlockRequest, Cliente, ClienteInput, Licenca, LicencaInput};

/// A record type served by a REST collection.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Body of `POST {path}`.
    type Create: Serialize + DeserializeOwned + Send + Sync;
    /// Body of `PUT {path}/{id}`.
    type Update: Serialize + DeserializeOwned + Send + Sync;

    fn id(&self) -> &EntityId;

    /// Human-readable name, used for select options and sorting.
    fn name(&self) -> &str;

    fn is_active(&self) -> bool;
}

/// `{ value, label }` pair for dropdowns, derived from the full list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: EntityId,
    pub label: String,
}

pub(crate) fn default_true() -> bool {
    true
}
