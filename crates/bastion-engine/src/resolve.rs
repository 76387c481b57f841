//! Flag resolution over the regions covering one point.
//!
//! Resolution runs in three steps for each applicable region:
//!
//! 1. Effective value: the first explicit value found walking the region's
//!    parent chain. A value of the wrong kind is no opinion.
//! 2. Group scope: the companion `-group` flag, resolved the same way and
//!    defaulting to `all`, must admit the actor's association with the
//!    region, or the value is discarded.
//! 3. Combination: surviving values are grouped into tiers by priority,
//!    highest first, with global regions always last. The first non-empty
//!    tier decides. For state flags `deny` beats `allow` inside a tier;
//!    for other kinds the smallest region id wins.
//!
//! If no region contributes, the flag's registered default applies.
//! Resolution never fails: malformed data is treated as no opinion.

use std::sync::Arc;

use bastion_core::{Actor, Association, BlockPos, FlagId, FlagKind, FlagValue, RegionGroup, RegionId, State};
use smallvec::SmallVec;

use crate::region::Region;
use crate::snapshot::{RegionIdx, RegionSnapshot};

/// Ordering key for combination. Derived `Ord` compares `bounded` first,
/// so any bounded region outranks a global one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Tier {
    bounded: bool,
    priority: i32,
}

impl Tier {
    fn of(region: &Region) -> Self {
        Self {
            bounded: !region.is_global(),
            priority: region.priority(),
        }
    }
}

struct Opinion<'a> {
    tier: Tier,
    id: &'a RegionId,
    value: &'a FlagValue,
}

/// The regions that contain one point, bound to the snapshot they were
/// found in.
///
/// The set keeps its snapshot alive, so answers stay consistent even if
/// the manager publishes a new region set in the meantime.
#[derive(Clone, Debug)]
pub struct ApplicableRegionSet {
    snapshot: Arc<RegionSnapshot>,
    regions: SmallVec<[RegionIdx; 8]>,
}

impl ApplicableRegionSet {
    pub(crate) fn at(snapshot: Arc<RegionSnapshot>, point: BlockPos) -> Self {
        let regions = snapshot
            .spatial_index()
            .candidates(point)
            .into_iter()
            .filter(|&idx| snapshot.region_at(idx).is_some_and(|r| r.contains(point)))
            .collect();
        Self { snapshot, regions }
    }

    /// Number of applicable regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no region contains the point.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The applicable regions, unsorted.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions
            .iter()
            .filter_map(|&idx| self.snapshot.region_at(idx))
    }

    /// Ids of the applicable regions, unsorted.
    pub fn ids(&self) -> impl Iterator<Item = &RegionId> {
        self.iter().map(Region::id)
    }

    /// The snapshot this set was computed from.
    pub fn snapshot(&self) -> &Arc<RegionSnapshot> {
        &self.snapshot
    }

    /// Resolve `flag` for `actor`. `None` means neither a region nor the
    /// flag's default provides a value, or the flag is unknown.
    pub fn query_value(&self, actor: Option<&dyn Actor>, flag: FlagId) -> Option<FlagValue> {
        let def = self.snapshot.catalog().get(flag)?;
        let mut opinions: SmallVec<[Opinion<'_>; 8]> = SmallVec::new();
        for &idx in &self.regions {
            let Some(region) = self.snapshot.region_at(idx) else {
                continue;
            };
            let Some(value) = self.effective(idx, flag) else {
                continue;
            };
            if value.kind() != def.kind {
                continue;
            }
            if let Some(group_flag) = def.group_flag {
                let group = match self.effective(idx, group_flag) {
                    None => RegionGroup::All,
                    Some(raw) => match raw.as_group() {
                        Some(group) => group,
                        None => continue,
                    },
                };
                if group != RegionGroup::All && !group.contains(self.association(idx, actor)) {
                    continue;
                }
            }
            opinions.push(Opinion {
                tier: Tier::of(region),
                id: region.id(),
                value,
            });
        }
        combine(def.kind, &opinions)
            .cloned()
            .or_else(|| def.default.clone())
    }

    /// [`query_value`](Self::query_value) for state flags.
    pub fn query_state(&self, actor: Option<&dyn Actor>, flag: FlagId) -> Option<State> {
        self.query_value(actor, flag)
            .and_then(|value| value.as_state())
    }

    /// Whether `flag` permits `actor`: true unless it resolves to `deny`.
    pub fn test_state(&self, actor: Option<&dyn Actor>, flag: FlagId) -> bool {
        self.query_state(actor, flag) != Some(State::Deny)
    }

    /// Whether `actor` owns every bounded region in the set, directly or
    /// through a parent. Vacuously true when no bounded region applies.
    pub fn is_owner_of_all(&self, actor: &dyn Actor) -> bool {
        self.bounded()
            .all(|idx| self.association(idx, Some(actor)) == Association::Owner)
    }

    /// Whether `actor` is a member (or owner) of every bounded region in
    /// the set. Vacuously true when no bounded region applies.
    pub fn is_member_of_all(&self, actor: &dyn Actor) -> bool {
        self.bounded()
            .all(|idx| self.association(idx, Some(actor)).is_member())
    }

    fn bounded(&self) -> impl Iterator<Item = RegionIdx> + '_ {
        self.regions.iter().copied().filter(|&idx| {
            self.snapshot
                .region_at(idx)
                .is_some_and(|r| !r.is_global())
        })
    }

    fn effective(&self, idx: RegionIdx, flag: FlagId) -> Option<&FlagValue> {
        self.snapshot
            .lineage_at(idx)
            .find_map(|region| region.flag(flag))
    }

    fn association(&self, idx: RegionIdx, actor: Option<&dyn Actor>) -> Association {
        let Some(actor) = actor else {
            return Association::NonMember;
        };
        let mut member = false;
        for region in self.snapshot.lineage_at(idx) {
            if region.owners().contains(actor) {
                return Association::Owner;
            }
            member = member || region.members().contains(actor);
        }
        if member {
            Association::Member
        } else {
            Association::NonMember
        }
    }
}

fn combine<'a>(kind: FlagKind, opinions: &[Opinion<'a>]) -> Option<&'a FlagValue> {
    let top = opinions.iter().map(|o| o.tier).max()?;
    let mut tier = opinions.iter().filter(|o| o.tier == top);
    if kind.is_binary() {
        // Every opinion is a state, so a non-empty tier always decides.
        let deny = tier
            .clone()
            .find(|o| o.value.as_state() == Some(State::Deny));
        return deny.or_else(|| tier.next()).map(|o| o.value);
    }
    tier.min_by(|a, b| a.id.cmp(b.id)).map(|o| o.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicatePolicy, IndexConfig};
    use bastion_core::{builtin, Domain, FlagCatalog};
    use bastion_test_utils::TestActor;

    fn id(s: &str) -> RegionId {
        RegionId::new(s).unwrap()
    }

    fn area(name: &str) -> Region {
        Region::cuboid(id(name), BlockPos::new(0, 0, 0), BlockPos::new(10, 10, 10))
    }

    const P: BlockPos = BlockPos::new(5, 5, 5);

    fn set_of(regions: Vec<Region>) -> ApplicableRegionSet {
        let mut snap =
            RegionSnapshot::empty(Arc::new(FlagCatalog::builtin()), &IndexConfig::default());
        for r in regions {
            snap.add(r, DuplicatePolicy::Reject).unwrap();
        }
        Arc::new(snap).applicable(P)
    }

    #[test]
    fn only_containing_regions_apply() {
        let far = Region::cuboid(id("far"), BlockPos::new(50, 0, 50), BlockPos::new(60, 10, 60));
        let set = set_of(vec![area("a"), far, Region::global(id("__global__"))]);
        let mut ids: Vec<&str> = set.ids().map(RegionId::as_str).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["__global__", "a"]);
    }

    #[test]
    fn empty_set_uses_defaults() {
        let set = set_of(vec![]);
        assert!(set.is_empty());
        assert_eq!(set.query_state(None, builtin::ENTRY), Some(State::Allow));
        assert_eq!(set.query_state(None, builtin::BUILD), None);
        assert!(set.test_state(None, builtin::BUILD));
        assert_eq!(set.query_value(None, builtin::BUYABLE), Some(FlagValue::Boolean(false)));
        assert_eq!(set.query_value(None, FlagId(9999)), None);
        assert!(set.test_state(None, FlagId(9999)));
    }

    #[test]
    fn higher_priority_wins() {
        let set = set_of(vec![
            area("low").with_flag(builtin::PVP, State::Deny),
            area("high").with_priority(10).with_flag(builtin::PVP, State::Allow),
        ]);
        assert_eq!(set.query_state(None, builtin::PVP), Some(State::Allow));
    }

    #[test]
    fn deny_wins_within_a_tier() {
        let set = set_of(vec![
            area("a").with_flag(builtin::PVP, State::Allow),
            area("b").with_flag(builtin::PVP, State::Deny),
        ]);
        assert_eq!(set.query_state(None, builtin::PVP), Some(State::Deny));
        assert!(!set.test_state(None, builtin::PVP));
    }

    #[test]
    fn global_region_is_always_last() {
        let set = set_of(vec![
            Region::global(id("__global__"))
                .with_priority(1000)
                .with_flag(builtin::PVP, State::Deny),
            area("arena")
                .with_priority(-5)
                .with_flag(builtin::PVP, State::Allow),
        ]);
        assert_eq!(set.query_state(None, builtin::PVP), Some(State::Allow));

        let only_global = set_of(vec![
            Region::global(id("__global__")).with_flag(builtin::PVP, State::Deny),
            area("quiet"),
        ]);
        assert_eq!(only_global.query_state(None, builtin::PVP), Some(State::Deny));
    }

    #[test]
    fn non_state_ties_break_on_smallest_id() {
        let set = set_of(vec![
            area("zeta").with_flag(builtin::GREETING, "from zeta"),
            area("alpha").with_flag(builtin::GREETING, "from alpha"),
            area("mid").with_priority(-1).with_flag(builtin::GREETING, "ignored"),
        ]);
        assert_eq!(
            set.query_value(None, builtin::GREETING),
            Some(FlagValue::String("from alpha".into()))
        );
    }

    #[test]
    fn values_are_inherited_from_parents() {
        let parent = Region::cuboid(id("town"), BlockPos::new(-100, 0, -100), BlockPos::new(-90, 0, -90))
            .with_flag(builtin::BUILD, State::Deny)
            .with_flag(builtin::GREETING, "welcome");
        let child = area("plot")
            .with_parent(id("town"))
            .with_flag(builtin::GREETING, "plot");
        let set = set_of(vec![parent, child]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.query_state(None, builtin::BUILD), Some(State::Deny));
        assert_eq!(
            set.query_value(None, builtin::GREETING),
            Some(FlagValue::String("plot".into()))
        );
    }

    #[test]
    fn group_scope_filters_by_membership() {
        let mut members = Domain::new();
        members.add_group("vip");
        let set = set_of(vec![area("club")
            .with_members(members)
            .with_flag(builtin::ENTRY, State::Deny)
            .with_flag(builtin::ENTRY_GROUP, RegionGroup::NonMembers)]);

        let vip = TestActor::new("vip").with_group("vip");
        let other = TestActor::new("other").with_group("builder");
        assert!(set.test_state(Some(&vip), builtin::ENTRY));
        assert!(!set.test_state(Some(&other), builtin::ENTRY));
        assert!(!set.test_state(None, builtin::ENTRY));
    }

    #[test]
    fn ownership_is_inherited_for_scope() {
        let mut owners = Domain::new();
        owners.add_player_name("mayor");
        let town = Region::cuboid(id("town"), BlockPos::new(-100, 0, -100), BlockPos::new(-90, 0, -90))
            .with_owners(owners);
        let plot = area("plot")
            .with_parent(id("town"))
            .with_flag(builtin::BUILD, State::Deny)
            .with_flag(builtin::BUILD_GROUP, RegionGroup::NonOwners);
        let set = set_of(vec![town, plot]);

        let mayor = TestActor::new("mayor");
        let visitor = TestActor::new("visitor");
        assert!(set.test_state(Some(&mayor), builtin::BUILD));
        assert!(!set.test_state(Some(&visitor), builtin::BUILD));
        assert!(set.is_owner_of_all(&mayor));
        assert!(set.is_member_of_all(&mayor));
        assert!(!set.is_member_of_all(&visitor));
    }

    fn town_with_resident_scope() -> Region {
        let mut members = Domain::new();
        members.add_player_name("resident");
        Region::cuboid(id("town"), BlockPos::new(-100, 0, -100), BlockPos::new(-90, 0, -90))
            .with_members(members)
            .with_flag(builtin::BUILD_GROUP, RegionGroup::NonMembers)
    }

    #[test]
    fn group_scope_is_inherited_from_parent() {
        let plot = area("plot")
            .with_parent(id("town"))
            .with_flag(builtin::BUILD, State::Deny);
        let set = set_of(vec![town_with_resident_scope(), plot]);

        let resident = TestActor::new("resident");
        let stranger = TestActor::new("stranger");
        assert!(set.test_state(Some(&resident), builtin::BUILD));
        assert_eq!(set.query_state(Some(&resident), builtin::BUILD), None);
        assert!(!set.test_state(Some(&stranger), builtin::BUILD));
        assert!(!set.test_state(None, builtin::BUILD));
    }

    #[test]
    fn child_scope_overrides_inherited_scope() {
        let plot = area("plot")
            .with_parent(id("town"))
            .with_flag(builtin::BUILD, State::Deny)
            .with_flag(builtin::BUILD_GROUP, RegionGroup::All);
        let set = set_of(vec![town_with_resident_scope(), plot]);

        let resident = TestActor::new("resident");
        let stranger = TestActor::new("stranger");
        assert!(!set.test_state(Some(&resident), builtin::BUILD));
        assert!(!set.test_state(Some(&stranger), builtin::BUILD));
    }

    #[test]
    fn members_scope_ignores_strangers() {
        let mut members = Domain::new();
        members.add_player_name("friend");
        let set = set_of(vec![area("yard")
            .with_members(members)
            .with_flag(builtin::PVP, State::Deny)
            .with_flag(builtin::PVP_GROUP, RegionGroup::Members)]);
        let friend = TestActor::new("friend");
        let stranger = TestActor::new("stranger");
        assert!(!set.test_state(Some(&friend), builtin::PVP));
        assert!(set.test_state(Some(&stranger), builtin::PVP));
        assert_eq!(set.query_state(Some(&stranger), builtin::PVP), None);
    }
}
