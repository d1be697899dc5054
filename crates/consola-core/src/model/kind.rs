// ── Entity kinds ──
//
// Closed set of resources the console manages. Everything that differs
// per resource (REST path, labels, write policy, relationships) is an
// exhaustive match here rather than a string-keyed lookup.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Every resource managed by the console.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Area,
    Aplicacao,
    Modulo,
    Funcionalidade,
    Licenca,
    Cliente,
    Utilizador,
    Perfil,
}

/// What a create/update does with a 4xx response that carries an
/// envelope body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Return the backend messages as a `Submission::Invalid` so the form
    /// can render them next to the fields.
    InlineValidation,
    /// Surface the response as a `DomainError::Rejected`.
    HardError,
}

impl EntityKind {
    /// REST collection path, relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Area => "api/areas",
            Self::Aplicacao => "api/aplicacoes",
            Self::Modulo => "api/modulos",
            Self::Funcionalidade => "api/funcionalidades",
            Self::Licenca => "api/licencas",
            Self::Cliente => "api/clientes",
            Self::Utilizador => "api/utilizadores",
            Self::Perfil => "api/perfis",
        }
    }

    /// Singular display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Area => "Área",
            Self::Aplicacao => "Aplicação",
            Self::Modulo => "Módulo",
            Self::Funcionalidade => "Funcionalidade",
            Self::Licenca => "Licença",
            Self::Cliente => "Cliente",
            Self::Utilizador => "Utilizador",
            Self::Perfil => "Perfil",
        }
    }

    /// Plural display label.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Area => "Áreas",
            Self::Aplicacao => "Aplicações",
            Self::Modulo => "Módulos",
            Self::Funcionalidade => "Funcionalidades",
            Self::Licenca => "Licenças",
            Self::Cliente => "Clientes",
            Self::Utilizador => "Utilizadores",
            Self::Perfil => "Perfis",
        }
    }

    /// URL query parameter that seeds a filter on pages listing records
    /// that reference this kind (e.g. `?areaId=`).
    pub fn seed_param(self) -> &'static str {
        match self {
            Self::Area => "areaId",
            Self::Aplicacao => "aplicacaoId",
            Self::Modulo => "moduloId",
            Self::Funcionalidade => "funcionalidadeId",
            Self::Licenca => "licencaId",
            Self::Cliente => "clienteId",
            Self::Utilizador => "utilizadorId",
            Self::Perfil => "perfilId",
        }
    }

    /// The kind this one is scoped under for relationship reads
    /// (modules by application, and so on).
    pub fn parent(self) -> Option<EntityKind> {
        match self {
            Self::Aplicacao => Some(Self::Area),
            Self::Modulo => Some(Self::Aplicacao),
            Self::Funcionalidade => Some(Self::Modulo),
            Self::Utilizador => Some(Self::Licenca),
            Self::Area | Self::Licenca | Self::Cliente | Self::Perfil => None,
        }
    }

    /// Kinds whose cached lists go stale when this kind is written.
    pub fn related(self) -> &'static [EntityKind] {
        match self {
            Self::Utilizador => &[Self::Licenca],
            Self::Licenca => &[Self::Utilizador, Self::Cliente],
            Self::Perfil => &[Self::Utilizador],
            Self::Cliente => &[Self::Licenca],
            Self::Area => &[Self::Aplicacao],
            Self::Aplicacao => &[Self::Modulo, Self::Licenca],
            Self::Modulo => &[Self::Funcionalidade],
            Self::Funcionalidade => &[],
        }
    }

    /// How create/update treat 4xx envelopes for this kind.
    pub fn write_policy(self) -> WritePolicy {
        match self {
            Self::Area
            | Self::Aplicacao
            | Self::Modulo
            | Self::Funcionalidade
            | Self::Cliente
            | Self::Perfil => WritePolicy::InlineValidation,
            Self::Licenca | Self::Utilizador => WritePolicy::HardError,
        }
    }

    /// Whether `path` (as used in a response-cache key) addresses this
    /// kind's collection or one of its sub-resources.
    pub fn owns_path(self, path: &str) -> bool {
        let base = self.path();
        path == base
            || path
                .strip_prefix(base)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Licenca".parse::<EntityKind>().unwrap(), EntityKind::Licenca);
        assert_eq!("utilizador".parse::<EntityKind>().unwrap(), EntityKind::Utilizador);
        assert!("users".parse::<EntityKind>().is_err());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(EntityKind::Funcionalidade.to_string(), "funcionalidade");
    }

    #[test]
    fn owns_path_respects_segment_boundaries() {
        assert!(EntityKind::Area.owns_path("api/areas"));
        assert!(EntityKind::Area.owns_path("api/areas/paginated"));
        assert!(!EntityKind::Area.owns_path("api/areasx"));
        assert!(!EntityKind::Modulo.owns_path("api/aplicacoes/1"));
    }

    #[test]
    fn no_kind_is_its_own_relation() {
        for kind in EntityKind::iter() {
            assert!(!kind.related().contains(&kind), "{kind} relates to itself");
        }
    }

    #[test]
    fn seed_params_are_unique() {
        let mut seen: Vec<&str> = EntityKind::iter().map(EntityKind::seed_param).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), EntityKind::iter().count());
    }
}
