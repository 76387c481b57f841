//! [`Domain`]: a membership set of accounts, legacy names and groups.

use std::collections::BTreeSet;

use crate::actor::Actor;
use crate::id::AccountId;

/// A set of matchable membership criteria.
///
/// An actor is contained if its account id, its display name or any of
/// the listed groups match. Player names exist for regions created before
/// stable account ids and are compared case-sensitively. Group names are
/// stored in lower case.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Domain {
    unique_ids: BTreeSet<AccountId>,
    players: BTreeSet<String>,
    groups: BTreeSet<String>,
}

impl Domain {
    /// An empty domain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account by stable id.
    pub fn add_player_id(&mut self, id: AccountId) {
        self.unique_ids.insert(id);
    }

    /// Add a legacy player name. Empty names are ignored.
    pub fn add_player_name(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.players.insert(name.to_string());
        }
    }

    /// Add a group. The name is trimmed and lowercased; empty names are ignored.
    pub fn add_group(&mut self, group: &str) {
        let group = group.trim();
        if !group.is_empty() {
            self.groups.insert(group.to_lowercase());
        }
    }

    /// Remove an account id. Returns whether it was present.
    pub fn remove_player_id(&mut self, id: &AccountId) -> bool {
        self.unique_ids.remove(id)
    }

    /// Remove a legacy player name. Returns whether it was present.
    pub fn remove_player_name(&mut self, name: &str) -> bool {
        self.players.remove(name.trim())
    }

    /// Remove a group. Returns whether it was present.
    pub fn remove_group(&mut self, group: &str) -> bool {
        self.groups.remove(&group.trim().to_lowercase())
    }

    /// Merge every criterion of `other` into `self`.
    pub fn add_all(&mut self, other: &Domain) {
        self.unique_ids.extend(other.unique_ids.iter().copied());
        self.players.extend(other.players.iter().cloned());
        self.groups.extend(other.groups.iter().cloned());
    }

    /// Whether the actor matches any criterion.
    ///
    /// Criteria are checked cheapest first: account id, then name, then
    /// groups (which may hit the host's permission backend).
    pub fn contains(&self, actor: &dyn Actor) -> bool {
        self.contains_id(&actor.unique_id())
            || self.contains_name(actor.name())
            || self.groups.iter().any(|g| actor.has_group(g))
    }

    /// Whether the account id is listed.
    pub fn contains_id(&self, id: &AccountId) -> bool {
        self.unique_ids.contains(id)
    }

    /// Whether the legacy name is listed (case-sensitive).
    pub fn contains_name(&self, name: &str) -> bool {
        self.players.contains(name)
    }

    /// Whether the group is listed (case-insensitive).
    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains(&group.to_lowercase())
    }

    /// Account ids in ascending order.
    pub fn unique_ids(&self) -> impl Iterator<Item = &AccountId> {
        self.unique_ids.iter()
    }

    /// Legacy player names in ascending order.
    pub fn player_names(&self) -> impl Iterator<Item = &str> {
        self.players.iter().map(String::as_str)
    }

    /// Group names in ascending order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    /// Total number of criteria.
    pub fn len(&self) -> usize {
        self.unique_ids.len() + self.players.len() + self.groups.len()
    }

    /// Whether no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        id: AccountId,
        name: &'static str,
        groups: &'static [&'static str],
    }

    impl Actor for Probe {
        fn unique_id(&self) -> AccountId {
            self.id
        }
        fn name(&self) -> &str {
            self.name
        }
        fn has_group(&self, group: &str) -> bool {
            self.groups.contains(&group)
        }
    }

    fn probe(groups: &'static [&'static str]) -> Probe {
        Probe {
            id: AccountId::random(),
            name: "Notch",
            groups,
        }
    }

    #[test]
    fn empty_domain_contains_nobody() {
        let d = Domain::new();
        assert!(d.is_empty());
        assert!(!d.contains(&probe(&["vip"])));
    }

    #[test]
    fn matches_by_id() {
        let p = probe(&[]);
        let mut d = Domain::new();
        d.add_player_id(p.id);
        assert!(d.contains(&p));
        assert!(!d.contains(&probe(&[])));
    }

    #[test]
    fn legacy_names_are_case_sensitive() {
        let mut d = Domain::new();
        d.add_player_name("notch");
        assert!(!d.contains(&probe(&[])));
        d.add_player_name("Notch");
        assert!(d.contains(&probe(&[])));
    }

    #[test]
    fn groups_are_normalized() {
        let mut d = Domain::new();
        d.add_group("  VIP ");
        assert!(d.contains_group("vip"));
        assert!(d.contains_group("Vip"));
        assert!(d.contains(&probe(&["vip"])));
        assert!(!d.contains(&probe(&["builder"])));
    }

    #[test]
    fn blank_entries_are_ignored() {
        let mut d = Domain::new();
        d.add_group("   ");
        d.add_player_name("");
        assert!(d.is_empty());
    }

    #[test]
    fn add_all_merges_and_remove_works() {
        let mut a = Domain::new();
        a.add_group("builder");
        let mut b = Domain::new();
        b.add_group("vip");
        b.add_player_name("Notch");
        a.add_all(&b);
        assert_eq!(a.len(), 3);
        assert!(a.remove_group("VIP"));
        assert!(!a.remove_group("vip"));
        assert!(a.remove_player_name("Notch"));
        assert_eq!(a.groups().collect::<Vec<_>>(), vec!["builder"]);
    }
}
