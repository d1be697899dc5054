// ── Users and profiles ──

use serde::{Deserialize, Serialize};

use super::{EntityId, EntityKind, Resource, default_true};

/// A console user, attached to a tenant and a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utilizador {
    pub id: EntityId,
    pub nome: String,
    pub email: String,
    #[serde(default)]
    pub perfil_id: Option<EntityId>,
    #[serde(default)]
    pub perfil_nome: Option<String>,
    #[serde(default)]
    pub cliente_id: Option<EntityId>,
    #[serde(default)]
    pub cliente_nome: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizadorInput {
    pub nome: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfil_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_id: Option<EntityId>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

impl Resource for Utilizador {
    const KIND: EntityKind = EntityKind::Utilizador;
    type Create = UtilizadorInput;
    type Update = UtilizadorInput;

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

/// A permission profile assigned to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perfil {
    pub id: EntityId,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfilInput {
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

impl Resource for Perfil {
    const KIND: EntityKind = EntityKind::Perfil;
    type Create = PerfilInput;
    type Update = PerfilInput;

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
