//! Strongly-typed identifiers: [`RegionId`], [`AccountId`] and [`FlagId`].

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::IdError;

/// Name of a region, unique within one world's region set.
///
/// Region ids are case-insensitive: construction normalizes to lower case,
/// so `"Spawn"` and `"spawn"` name the same region. Ordering is the plain
/// lexicographic order of the normalized string, which is what the
/// resolution engine uses to break ties between equal-priority regions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(String);

impl RegionId {
    /// Validate and normalize a region id.
    ///
    /// Accepts ASCII letters, digits and `_ , ' - + /`. The empty string
    /// is rejected.
    pub fn new(raw: &str) -> Result<Self, IdError> {
        if raw.is_empty() {
            return Err(IdError::EmptyRegionId);
        }
        if let Some(c) = raw.chars().find(|c| !Self::is_valid_char(*c)) {
            return Err(IdError::InvalidRegionId {
                id: raw.to_string(),
                invalid: c,
            });
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Whether `c` may appear in a region id.
    pub fn is_valid_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | ',' | '\'' | '-' | '+' | '/')
    }

    /// The normalized id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RegionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RegionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Stable account identifier of a player.
///
/// Displays and parses as the hyphenated UUID form used in region files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Allocate a random account id. Mostly useful in tests.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for AccountId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| IdError::InvalidAccountId {
                raw: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl From<Uuid> for AccountId {
    fn from(v: Uuid) -> Self {
        Self(v)
    }
}

/// Identifies a flag within a [`FlagCatalog`](crate::FlagCatalog).
///
/// Flags are registered at startup and assigned sequential ids.
/// `FlagId(n)` is the n-th registered flag. Builtin flags occupy the
/// lowest ids, see [`builtin`](crate::catalog::builtin).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlagId(pub u32);

impl fmt::Display for FlagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FlagId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
