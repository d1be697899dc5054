// ── Record identity ──
//
// Most tables are keyed by GUIDs. Users provisioned by the identity
// provider carry opaque string keys, and a few lookup tables (perfis)
// still send integer ids. All three read back as one `EntityId`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Identifier of a backend record, as it appears in paths and bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Guid(Uuid),
    /// Anything that is not a GUID, kept verbatim (numbers as decimal).
    Opaque(String),
}

impl EntityId {
    pub fn guid(&self) -> Option<Uuid> {
        match self {
            Self::Guid(u) => Some(*u),
            Self::Opaque(_) => None,
        }
    }

    pub fn is_guid(&self) -> bool {
        matches!(self, Self::Guid(_))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guid(u) => write!(f, "{}", u.hyphenated()),
            Self::Opaque(s) => f.write_str(s),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Guid(u)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        let s = s.trim();
        Uuid::parse_str(s).map_or_else(|_| Self::Opaque(s.to_owned()), Self::Guid)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Opaque(n.to_string())
    }
}

// Always a JSON string on the way out; string or integer on the way in.

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct EntityIdVisitor;

impl Visitor<'_> for EntityIdVisitor {
    type Value = EntityId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a GUID, string key or integer id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
        if v.trim().is_empty() {
            return Err(E::invalid_value(de::Unexpected::Str(v), &self));
        }
        Ok(EntityId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
        Ok(EntityId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
        Ok(EntityId::Opaque(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntityIdVisitor)
    }
}
