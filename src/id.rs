//! Identifiers: a node or edge id is either an integer or a string.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A node or edge identifier.
///
/// Ordering is total: every [`Id::Int`] compares less than every [`Id::Str`];
/// within a variant, natural ordering applies. Equality and hashing are
/// type-discriminating, so `Id::Int(1)` never equals `Id::Str("1")`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Int(i64),
    Str(String),
}

impl From<i64> for Id {
    fn from(v: i64) -> Self {
        Id::Int(v)
    }
}

impl From<&str> for Id {
    fn from(v: &str) -> Self {
        Id::Str(v.to_string())
    }
}

impl From<String> for Id {
    fn from(v: String) -> Self {
        Id::Str(v)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(i) => write!(f, "{}", i),
            Id::Str(s) => write!(f, "{}", s),
        }
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Id::Int(a), Id::Int(b)) => a.cmp(b),
            (Id::Str(a), Id::Str(b)) => a.cmp(b),
            (Id::Int(_), Id::Str(_)) => Ordering::Less,
            (Id::Str(_), Id::Int(_)) => Ordering::Greater,
        }
    }
}
