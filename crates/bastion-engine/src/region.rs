//! [`Region`]: a named, prioritized, shaped area with flags and members.

use std::collections::BTreeMap;

use bastion_core::{Actor, BlockPos, BlockPos2, Domain, FlagId, FlagValue, RegionId};
use bastion_space::{BoundingBox, Shape, ShapeError};

/// A protected region.
///
/// A free-standing `Region` is plain data. Hierarchy invariants (the
/// parent exists in the same set, the chain is acyclic) and flag kinds
/// are enforced by the [`RegionManager`](crate::RegionManager) when the
/// region is added or modified through it.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    id: RegionId,
    shape: Shape,
    priority: i32,
    owners: Domain,
    members: Domain,
    flags: BTreeMap<FlagId, FlagValue>,
    parent: Option<RegionId>,
}

impl Region {
    /// A region with priority 0, no members, no flags and no parent.
    pub fn new(id: RegionId, shape: Shape) -> Self {
        Self {
            id,
            shape,
            priority: 0,
            owners: Domain::new(),
            members: Domain::new(),
            flags: BTreeMap::new(),
            parent: None,
        }
    }

    /// Cuboid region spanning two arbitrary corners.
    pub fn cuboid(id: RegionId, a: BlockPos, b: BlockPos) -> Self {
        Self::new(id, Shape::cuboid(a, b))
    }

    /// Polygonal prism region.
    pub fn polygon(
        id: RegionId,
        points: Vec<BlockPos2>,
        min_y: i32,
        max_y: i32,
    ) -> Result<Self, ShapeError> {
        Ok(Self::new(id, Shape::polygon(points, min_y, max_y)?))
    }

    /// World-wide fallback region.
    pub fn global(id: RegionId) -> Self {
        Self::new(id, Shape::Global)
    }

    /// Builder-style [`set_priority`](Self::set_priority).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Builder-style [`set_owners`](Self::set_owners).
    pub fn with_owners(mut self, owners: Domain) -> Self {
        self.owners = owners;
        self
    }

    /// Builder-style [`set_members`](Self::set_members).
    pub fn with_members(mut self, members: Domain) -> Self {
        self.members = members;
        self
    }

    /// Builder-style [`set_flag`](Self::set_flag).
    pub fn with_flag(mut self, flag: FlagId, value: impl Into<FlagValue>) -> Self {
        self.flags.insert(flag, value.into());
        self
    }

    /// Builder-style [`set_parent`](Self::set_parent).
    pub fn with_parent(mut self, parent: RegionId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Region id.
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    /// Region shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Priority; higher is evaluated first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Owners domain.
    pub fn owners(&self) -> &Domain {
        &self.owners
    }

    /// Members domain. Owners are implicitly members as well.
    pub fn members(&self) -> &Domain {
        &self.members
    }

    /// Explicit value of `flag`, without consulting the parent chain.
    pub fn flag(&self, flag: FlagId) -> Option<&FlagValue> {
        self.flags.get(&flag)
    }

    /// All explicit flag values.
    pub fn flags(&self) -> &BTreeMap<FlagId, FlagValue> {
        &self.flags
    }

    /// Parent id, if linked.
    pub fn parent(&self) -> Option<&RegionId> {
        self.parent.as_ref()
    }

    /// Set the priority.
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Replace the owners domain.
    pub fn set_owners(&mut self, owners: Domain) {
        self.owners = owners;
    }

    /// Replace the members domain.
    pub fn set_members(&mut self, members: Domain) {
        self.members = members;
    }

    /// Set an explicit flag value, returning the previous one.
    pub fn set_flag(&mut self, flag: FlagId, value: FlagValue) -> Option<FlagValue> {
        self.flags.insert(flag, value)
    }

    /// Unset a flag, returning the previous value.
    pub fn clear_flag(&mut self, flag: FlagId) -> Option<FlagValue> {
        self.flags.remove(&flag)
    }

    /// Replace every explicit flag value.
    pub fn set_flags(&mut self, flags: BTreeMap<FlagId, FlagValue>) {
        self.flags = flags;
    }

    /// Set or clear the parent id. Not validated here.
    pub fn set_parent(&mut self, parent: Option<RegionId>) {
        self.parent = parent;
    }

    /// Exact containment test.
    pub fn contains(&self, p: BlockPos) -> bool {
        self.shape.contains(p)
    }

    /// Whether this is a global (unbounded) region.
    pub fn is_global(&self) -> bool {
        self.shape.is_global()
    }

    /// Bounding box of the shape.
    pub fn bounding_box(&self) -> BoundingBox {
        self.shape.bounding_box()
    }

    /// Whether `actor` is listed as an owner of this region itself.
    pub fn is_owner_direct(&self, actor: &dyn Actor) -> bool {
        self.owners.contains(actor)
    }

    /// Whether `actor` is an owner or member of this region itself.
    pub fn is_member_direct(&self, actor: &dyn Actor) -> bool {
        self.owners.contains(actor) || self.members.contains(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{builtin, State};
    use bastion_test_utils::TestActor;

    fn id(s: &str) -> RegionId {
        RegionId::new(s).unwrap()
    }

    #[test]
    fn builder_sets_fields() {
        let mut owners = Domain::new();
        owners.add_group("builder");
        let r = Region::cuboid(id("Plot"), BlockPos::new(0, 0, 0), BlockPos::new(4, 4, 4))
            .with_priority(5)
            .with_owners(owners.clone())
            .with_flag(builtin::BUILD, State::Deny)
            .with_parent(id("town"));
        assert_eq!(r.id().as_str(), "plot");
        assert_eq!(r.priority(), 5);
        assert_eq!(r.owners(), &owners);
        assert_eq!(r.flag(builtin::BUILD), Some(&FlagValue::State(State::Deny)));
        assert_eq!(r.parent(), Some(&id("town")));
        assert!(r.contains(BlockPos::new(4, 0, 2)));
        assert!(!r.is_global());
    }

    #[test]
    fn set_and_clear_flags() {
        let mut r = Region::global(id("__global__"));
        assert!(r.is_global());
        assert_eq!(r.set_flag(builtin::PVP, State::Deny.into()), None);
        assert_eq!(
            r.set_flag(builtin::PVP, State::Allow.into()),
            Some(FlagValue::State(State::Deny))
        );
        assert_eq!(r.clear_flag(builtin::PVP), Some(FlagValue::State(State::Allow)));
        assert!(r.flags().is_empty());
    }

    #[test]
    fn owners_count_as_members() {
        let owner = TestActor::new("alice").with_group("builder");
        let member = TestActor::new("bob").with_group("vip");
        let stranger = TestActor::new("carol");
        let mut owners = Domain::new();
        owners.add_group("builder");
        let mut members = Domain::new();
        members.add_group("vip");
        let r = Region::global(id("g"))
            .with_owners(owners)
            .with_members(members);
        assert!(r.is_owner_direct(&owner));
        assert!(r.is_member_direct(&owner));
        assert!(!r.is_owner_direct(&member));
        assert!(r.is_member_direct(&member));
        assert!(!r.is_member_direct(&stranger));
    }
}
