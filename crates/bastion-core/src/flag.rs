//! Flag definitions, kinds and values.

use crate::actor::Association;
use crate::id::FlagId;

/// Classification of a flag's value type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlagKind {
    /// Binary allow/deny flag. Resolved with deny-wins-within-tier semantics.
    State,
    /// Plain boolean setting.
    Boolean,
    /// Signed integer setting.
    Integer,
    /// Floating-point setting.
    Double,
    /// Free-form text (greeting messages and the like).
    String,
    /// A [`RegionGroup`] scope, used by group-scope companion flags.
    Group,
}

impl FlagKind {
    /// Whether values of this kind combine with deny-wins semantics.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::State)
    }
}

/// Value of a state flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// Permissive.
    Allow,
    /// Restrictive.
    Deny,
}

impl State {
    /// Canonical lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }

    /// Parse `allow`/`deny`, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "allow" => Some(Self::Allow),
            "deny" => Some(Self::Deny),
            _ => None,
        }
    }
}

/// Membership class that a flag's explicit value applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionGroup {
    /// Everyone.
    All,
    /// Owners only.
    Owners,
    /// Members, including owners.
    Members,
    /// Everyone except owners.
    NonOwners,
    /// Everyone who is neither member nor owner.
    NonMembers,
}

impl RegionGroup {
    /// Canonical lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Owners => "owners",
            Self::Members => "members",
            Self::NonOwners => "nonowners",
            Self::NonMembers => "nonmembers",
        }
    }

    /// Parse a group name, ignoring case, `_` and `-` separators.
    pub fn parse(raw: &str) -> Option<Self> {
        let squashed: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match squashed.as_str() {
            "all" | "everyone" => Some(Self::All),
            "owners" | "owner" => Some(Self::Owners),
            "members" | "member" => Some(Self::Members),
            "nonowners" | "nonowner" => Some(Self::NonOwners),
            "nonmembers" | "nonmember" => Some(Self::NonMembers),
            _ => None,
        }
    }

    /// Whether an actor with the given association falls in this class.
    pub fn contains(self, association: Association) -> bool {
        match self {
            Self::All => true,
            Self::Owners => association == Association::Owner,
            Self::Members => association.is_member(),
            Self::NonOwners => association != Association::Owner,
            Self::NonMembers => association == Association::NonMember,
        }
    }
}

/// An explicit or default flag value.
#[derive(Clone, Debug, PartialEq)]
pub enum FlagValue {
    /// [`FlagKind::State`].
    State(State),
    /// [`FlagKind::Boolean`].
    Boolean(bool),
    /// [`FlagKind::Integer`].
    Integer(i64),
    /// [`FlagKind::Double`].
    Double(f64),
    /// [`FlagKind::String`].
    String(String),
    /// [`FlagKind::Group`].
    Group(RegionGroup),
}

impl FlagValue {
    /// The kind this value belongs to.
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::State(_) => FlagKind::State,
            Self::Boolean(_) => FlagKind::Boolean,
            Self::Integer(_) => FlagKind::Integer,
            Self::Double(_) => FlagKind::Double,
            Self::String(_) => FlagKind::String,
            Self::Group(_) => FlagKind::Group,
        }
    }

    /// The state, if this is a state value.
    pub fn as_state(&self) -> Option<State> {
        match self {
            Self::State(s) => Some(*s),
            _ => None,
        }
    }

    /// The group, if this is a group value.
    pub fn as_group(&self) -> Option<RegionGroup> {
        match self {
            Self::Group(g) => Some(*g),
            _ => None,
        }
    }
}

impl From<State> for FlagValue {
    fn from(v: State) -> Self {
        Self::State(v)
    }
}

impl From<RegionGroup> for FlagValue {
    fn from(v: RegionGroup) -> Self {
        Self::Group(v)
    }
}

impl From<bool> for FlagValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for FlagValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FlagValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for FlagValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// Definition of a registered flag.
///
/// Created through [`FlagCatalogBuilder`](crate::FlagCatalogBuilder); the
/// catalog guarantees `default` (if any) has kind `kind` and that
/// `group_flag` (if any) names a [`FlagKind::Group`] flag.
#[derive(Clone, Debug, PartialEq)]
pub struct FlagDef {
    /// Canonical lower-case name.
    pub name: String,
    /// Value kind.
    pub kind: FlagKind,
    /// Value used when no applicable region defines the flag.
    pub default: Option<FlagValue>,
    /// Companion flag narrowing which actors an explicit value applies to.
    pub group_flag: Option<FlagId>,
}
