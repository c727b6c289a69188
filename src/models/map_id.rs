use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Longest accepted map identifier.
pub const MAX_MAP_ID_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid map id '{0}': expected 1-64 characters of A-Z, a-z, 0-9, '_' or '-'")]
pub struct InvalidMapId(pub String);

/// Map identifier, safe to use as a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MapId(String);

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid map id pattern"))
}

impl MapId {
    pub fn parse(id: impl Into<String>) -> Result<Self, InvalidMapId> {
        let id = id.into();
        if pattern().is_match(&id) {
            Ok(Self(id))
        } else {
            Err(InvalidMapId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MapId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MapId {
    type Error = InvalidMapId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl std::str::FromStr for MapId {
    type Err = InvalidMapId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<MapId> for String {
    fn from(id: MapId) -> Self {
        id.0
    }
}
