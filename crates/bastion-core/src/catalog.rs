//! The flag catalog: a registry of typed flag definitions.
//!
//! Flags are registered once at startup through a [`FlagCatalogBuilder`]
//! and frozen into an immutable [`FlagCatalog`], which is then shared
//! (usually as `Arc<FlagCatalog>`) by every region manager in the process
//! and by the persistence layer for marshaling. Nothing can be registered
//! after [`FlagCatalogBuilder::build`], so queries never race registration.

use indexmap::IndexMap;

use crate::error::FlagError;
use crate::flag::{FlagDef, FlagKind, FlagValue, RegionGroup, State};
use crate::id::FlagId;

/// Maximum length of a flag name.
pub const MAX_FLAG_NAME_LEN: usize = 40;

/// Suffix appended to a state flag's name to form its group-scope companion.
pub const GROUP_FLAG_SUFFIX: &str = "-group";

/// Ids of the builtin flags registered by [`FlagCatalogBuilder::with_builtins`].
///
/// Builtins always occupy the lowest ids in this order, so these
/// constants are valid for every catalog built from `with_builtins()`.
pub mod builtin {
    use crate::id::FlagId;

    /// May blocks be placed or broken.
    pub const BUILD: FlagId = FlagId(0);
    /// Scope of [`BUILD`].
    pub const BUILD_GROUP: FlagId = FlagId(1);
    /// May the actor enter the region.
    pub const ENTRY: FlagId = FlagId(2);
    /// Scope of [`ENTRY`].
    pub const ENTRY_GROUP: FlagId = FlagId(3);
    /// May the actor leave the region.
    pub const EXIT: FlagId = FlagId(4);
    /// Scope of [`EXIT`].
    pub const EXIT_GROUP: FlagId = FlagId(5);
    /// Is player-versus-player combat allowed.
    pub const PVP: FlagId = FlagId(6);
    /// Scope of [`PVP`].
    pub const PVP_GROUP: FlagId = FlagId(7);
    /// May the actor interact with blocks and entities.
    pub const INTERACT: FlagId = FlagId(8);
    /// Scope of [`INTERACT`].
    pub const INTERACT_GROUP: FlagId = FlagId(9);
    /// May the actor use doors, levers and similar.
    pub const USE: FlagId = FlagId(10);
    /// Scope of [`USE`].
    pub const USE_GROUP: FlagId = FlagId(11);
    /// Do mobs spawn naturally.
    pub const MOB_SPAWNING: FlagId = FlagId(12);
    /// Message shown on entry.
    pub const GREETING: FlagId = FlagId(13);
    /// Message shown on exit.
    pub const FAREWELL: FlagId = FlagId(14);
    /// Health restored per heal tick.
    pub const HEAL_AMOUNT: FlagId = FlagId(15);
    /// Seconds between heal ticks.
    pub const HEAL_DELAY: FlagId = FlagId(16);
    /// Sale price of the region.
    pub const PRICE: FlagId = FlagId(17);
    /// Whether the region is for sale.
    pub const BUYABLE: FlagId = FlagId(18);
    /// Notify owners when someone enters.
    pub const NOTIFY_ENTER: FlagId = FlagId(19);

    /// Number of builtin flags.
    pub const COUNT: u32 = 20;
}

/// Mutable registry used during startup.
#[derive(Clone, Debug, Default)]
pub struct FlagCatalogBuilder {
    defs: Vec<FlagDef>,
    by_name: IndexMap<String, FlagId>,
}

impl FlagCatalogBuilder {
    /// An empty builder with no flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder pre-populated with the builtin flags (see [`builtin`]).
    pub fn with_builtins() -> Self {
        let mut b = Self::new();
        b.push_state("build", None, true);
        b.push_state("entry", Some(State::Allow), true);
        b.push_state("exit", Some(State::Allow), true);
        b.push_state("pvp", None, true);
        b.push_state("interact", None, true);
        b.push_state("use", None, true);
        b.push_state("mob-spawning", None, false);
        b.push("greeting", FlagKind::String, None, None);
        b.push("farewell", FlagKind::String, None, None);
        b.push("heal-amount", FlagKind::Integer, None, None);
        b.push("heal-delay", FlagKind::Integer, None, None);
        b.push("price", FlagKind::Double, None, None);
        b.push("buyable", FlagKind::Boolean, Some(FlagValue::Boolean(false)), None);
        b.push(
            "notify-enter",
            FlagKind::Boolean,
            Some(FlagValue::Boolean(false)),
            None,
        );
        debug_assert_eq!(b.defs.len() as u32, builtin::COUNT);
        b
    }

    /// Register a flag without a group-scope companion.
    pub fn register(
        &mut self,
        name: &str,
        kind: FlagKind,
        default: Option<FlagValue>,
    ) -> Result<FlagId, FlagError> {
        let name = self.check_name(name)?;
        if let Some(d) = &default {
            if d.kind() != kind {
                return Err(FlagError::DefaultKindMismatch {
                    name,
                    expected: kind,
                });
            }
        }
        Ok(self.push(&name, kind, default, None))
    }

    /// Register a state flag, optionally with a `<name>-group` companion
    /// whose default is [`RegionGroup::All`].
    ///
    /// Both names are checked before either is registered.
    pub fn register_state(
        &mut self,
        name: &str,
        default: Option<State>,
        scoped: bool,
    ) -> Result<FlagId, FlagError> {
        let name = self.check_name(name)?;
        if scoped {
            self.check_name(&format!("{name}{GROUP_FLAG_SUFFIX}"))?;
        }
        Ok(self.push_state(&name, default, scoped))
    }

    /// Freeze the registry.
    pub fn build(self) -> FlagCatalog {
        FlagCatalog {
            defs: self.defs,
            by_name: self.by_name,
        }
    }

    fn check_name(&self, raw: &str) -> Result<String, FlagError> {
        let name = raw.trim().to_ascii_lowercase();
        let valid = !name.is_empty()
            && name.len() <= MAX_FLAG_NAME_LEN
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':');
        if !valid {
            return Err(FlagError::InvalidName {
                name: raw.to_string(),
            });
        }
        if self.by_name.contains_key(&name) {
            return Err(FlagError::DuplicateName { name });
        }
        Ok(name)
    }

    /// The companion, when present, takes the id right after the main flag.
    fn push_state(&mut self, name: &str, default: Option<State>, scoped: bool) -> FlagId {
        let group_flag = scoped.then(|| FlagId(self.defs.len() as u32 + 1));
        let id = self.push(name, FlagKind::State, default.map(FlagValue::State), group_flag);
        if scoped {
            self.push(
                &format!("{name}{GROUP_FLAG_SUFFIX}"),
                FlagKind::Group,
                Some(FlagValue::Group(RegionGroup::All)),
                None,
            );
        }
        id
    }

    fn push(
        &mut self,
        name: &str,
        kind: FlagKind,
        default: Option<FlagValue>,
        group_flag: Option<FlagId>,
    ) -> FlagId {
        let id = FlagId(self.defs.len() as u32);
        self.defs.push(FlagDef {
            name: name.to_string(),
            kind,
            default,
            group_flag,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }
}

/// Immutable registry of flag definitions.
#[derive(Clone, Debug)]
pub struct FlagCatalog {
    defs: Vec<FlagDef>,
    by_name: IndexMap<String, FlagId>,
}

impl FlagCatalog {
    /// Catalog containing only the builtin flags.
    pub fn builtin() -> Self {
        FlagCatalogBuilder::with_builtins().build()
    }

    /// Look up a definition by id.
    pub fn get(&self, id: FlagId) -> Option<&FlagDef> {
        self.defs.get(id.0 as usize)
    }

    /// Look up an id by name, ignoring case.
    pub fn by_name(&self, name: &str) -> Option<FlagId> {
        self.by_name.get(&name.trim().to_ascii_lowercase()).copied()
    }

    /// Check that `value` may be assigned to `id`.
    pub fn validate(&self, id: FlagId, value: &FlagValue) -> Result<(), FlagError> {
        let def = self.get(id).ok_or(FlagError::UnknownFlag(id))?;
        if value.kind() != def.kind {
            return Err(FlagError::KindMismatch {
                name: def.name.clone(),
                expected: def.kind,
                actual: value.kind(),
            });
        }
        Ok(())
    }

    /// All definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = (FlagId, &FlagDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, d)| (FlagId(i as u32), d))
    }

    /// Number of registered flags.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no flags are registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
