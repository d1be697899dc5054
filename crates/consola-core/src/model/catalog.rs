// ── Application catalog: areas, applications, modules, features ──

use serde::{Deserialize, Serialize};

use super::{EntityId, EntityKind, Resource, default_true};

/// Business area grouping applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: EntityId,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub cor: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaInput {
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cor: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

impl Resource for Area {
    const KIND: EntityKind = EntityKind::Area;
    type Create = AreaInput;
    type Update = AreaInput;

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

/// An application offered to tenants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aplicacao {
    pub id: EntityId,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub versao: Option<String>,
    #[serde(default)]
    pub area_id: Option<EntityId>,
    #[serde(default)]
    pub area_nome: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AplicacaoInput {
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versao: Option<String>,
    pub area_id: EntityId,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

impl Resource for Aplicacao {
    const KIND: EntityKind = EntityKind::Aplicacao;
    type Create = AplicacaoInput;
    type Update = AplicacaoInput;

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

/// A module inside an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modulo {
    pub id: EntityId,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub aplicacao_id: Option<EntityId>,
    #[serde(default)]
    pub aplicacao_nome: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuloInput {
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub aplicacao_id: EntityId,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

impl Resource for Modulo {
    const KIND: EntityKind = EntityKind::Modulo;
    type Create = ModuloInput;
    type Update = ModuloInput;

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

/// A feature (permission unit) inside a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funcionalidade {
    pub id: EntityId,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub modulo_id: Option<EntityId>,
    #[serde(default)]
    pub modulo_nome: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuncionalidadeInput {
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub modulo_id: EntityId,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

impl Resource for Funcionalidade {
    const KIND: EntityKind = EntityKind::Funcionalidade;
    type Create = FuncionalidadeInput;
    type Update = FuncionalidadeInput;

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
