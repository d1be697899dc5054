// ── Tenants and licensing ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, EntityKind, Resource, default_true};

/// A tenant organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: EntityId,
    pub nome: String,
    #[serde(default)]
    pub nif: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub tem_api_key: bool,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteInput {
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nif: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

impl Resource for Cliente {
    const KIND: EntityKind = EntityKind::Cliente;
    type Create = ClienteInput;
    type Update = ClienteInput;

    fn id(&self) -> &EntityId {
        &self.id
    }
    fn name(&self) -> &str {
        &self.nome
    }
    fn is_active(&self) -> bool {
        self.ativo
    }
}

/// A client's right to use an application, bounded in time and seats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Licenca {
    pub id: EntityId,
    pub codigo: String,
    #[serde(default)]
    pub cliente_id: Option<EntityId>,
    #[serde(default)]
    pub cliente_nome: Option<String>,
    #[serde(default)]
    pub aplicacao_id: Option<EntityId>,
    #[serde(default)]
    pub aplicacao_nome: Option<String>,
    #[serde(default)]
    pub data_inicio: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data_fim: Option<DateTime<Utc>>,
    #[serde(default)]
    pub numero_maximo_utilizadores: u32,
    #[serde(default)]
    pub utilizadores_ativos: u32,
    #[serde(default)]
    pub bloqueada: bool,
    #[serde(default)]
    pub motivo_bloqueio: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

impl Licenca {
    /// Whether the license has passed its end date.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.data_fim.is_some_and(|fim| fim < now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicencaInput {
    pub codigo: String,
    pub cliente_id: EntityId,
    pub aplicacao_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_fim: Option<DateTime<Utc>>,
    #[serde(default)]
    pub numero_maximo_utilizadores: u32,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

impl Resource for Licenca {
    const KIND: EntityKind = EntityKind::Licenca;
    type Create = LicencaInput;
    type Update = LicencaInput;

    fn id(&self) -> &EntityId {
        &self.id
    }
    fn name(&self) -> &str {
        &self.codigo
    }
    fn is_active(&self) -> bool {
        self.ativo && !self.bloqueada
    }
}

/// Body of the license block call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    pub motivo: String,
}

/// A freshly issued or rotated tenant API key. The key is only ever
/// returned once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyIssued {
    pub api_key: String,
    #[serde(default)]
    pub criada_em: Option<DateTime<Utc>>,
}
