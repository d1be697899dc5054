// ── Roles ──
//
// Closed set of console roles. Menu entries and badge colours are
// exhaustive matches; a role string the console does not know becomes
// `Role::Unknown` and sees nothing rather than a guest default.

use std::fmt;
use std::str::FromStr;

use consola_api::TokenClaims;

use crate::model::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Gestor,
    Utilizador,
    /// A role claim the console has no mapping for (kept verbatim).
    Unknown(String),
}

/// Badge colour for a role, independent of the terminal palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleColor {
    Red,
    Blue,
    Green,
    Gray,
}

impl Role {
    /// Role from the token claims; a missing claim is `Unknown("")`.
    pub fn from_claims(claims: &TokenClaims) -> Self {
        claims
            .role
            .first()
            .map_or_else(|| Self::Unknown(String::new()), Self::parse)
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrador" => Self::Admin,
            "gestor" | "manager" => Self::Gestor,
            "utilizador" | "user" => Self::Utilizador,
            _ => Self::Unknown(raw.trim().to_owned()),
        }
    }

    /// Entity screens reachable by this role, in menu order.
    pub fn menu(&self) -> &'static [EntityKind] {
        match self {
            Self::Admin => &[
                EntityKind::Area,
                EntityKind::Aplicacao,
                EntityKind::Modulo,
                EntityKind::Funcionalidade,
                EntityKind::Cliente,
                EntityKind::Licenca,
                EntityKind::Utilizador,
                EntityKind::Perfil,
            ],
            Self::Gestor => &[
                EntityKind::Cliente,
                EntityKind::Licenca,
                EntityKind::Utilizador,
            ],
            Self::Utilizador => &[EntityKind::Licenca],
            Self::Unknown(_) => &[],
        }
    }

    pub fn can_access(&self, kind: EntityKind) -> bool {
        self.menu().contains(&kind)
    }

    pub fn color(&self) -> RoleColor {
        match self {
            Self::Admin => RoleColor::Red,
            Self::Gestor => RoleColor::Blue,
            Self::Utilizador => RoleColor::Green,
            Self::Unknown(_) => RoleColor::Gray,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Gestor => f.write_str("gestor"),
            Self::Utilizador => f.write_str("utilizador"),
            Self::Unknown(raw) if raw.is_empty() => f.write_str("(sem perfil)"),
            Self::Unknown(raw) => write!(f, "{raw} (desconhecido)"),
        }
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use consola_api::RoleClaim;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("ADMIN"), Role::Admin);
        assert_eq!(Role::parse(" Gestor "), Role::Gestor);
        assert_eq!(Role::parse("user"), Role::Utilizador);
    }

    #[test]
    fn unknown_role_sees_no_menu() {
        let role = Role::parse("auditor");
        assert_eq!(role, Role::Unknown("auditor".into()));
        assert!(role.menu().is_empty());
        assert!(!role.can_access(EntityKind::Area));
        assert_eq!(role.color(), RoleColor::Gray);
    }

    #[test]
    fn gestor_menu_is_tenant_scoped() {
        let role = Role::Gestor;
        assert!(role.can_access(EntityKind::Licenca));
        assert!(!role.can_access(EntityKind::Area));
    }

    #[test]
    fn role_from_claims_uses_first_role() {
        let claims = TokenClaims {
            role: RoleClaim::Many(vec!["Gestor".into(), "Admin".into()]),
            ..TokenClaims::default()
        };
        assert_eq!(Role::from_claims(&claims), Role::Gestor);
        assert_eq!(
            Role::from_claims(&TokenClaims::default()),
            Role::Unknown(String::new())
        );
    }
}
