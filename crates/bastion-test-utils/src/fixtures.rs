//! Reusable region fixtures.
//!
//! - [`entry_region`] / [`exit_region`]: the group-scoped entry and exit
//!   scenarios, with actors [`vip`] and [`builder`].
//! - [`scenario_manager`]: both scenario regions plus a global region.
//! - [`chain`] and [`grid`]: synthetic layouts for inheritance tests and
//!   benchmarks.

use std::sync::Arc;

use bastion_core::{builtin, BlockPos, Domain, FlagCatalog, RegionGroup, RegionId, State};
use bastion_engine::{Region, RegionManager};

use crate::TestActor;

/// Id of the global region in the scenario fixtures.
pub const GLOBAL: &str = "__global__";

/// Parse a region id, panicking on invalid input.
pub fn rid(raw: &str) -> RegionId {
    RegionId::new(raw).unwrap_or_else(|e| panic!("bad fixture id {raw:?}: {e}"))
}

/// The builtin catalog, shared.
pub fn catalog() -> Arc<FlagCatalog> {
    Arc::new(FlagCatalog::builtin())
}

/// Actor in group `vip` only.
pub fn vip() -> TestActor {
    TestActor::new("vee").with_group("vip")
}

/// Actor in group `builder` only.
pub fn builder() -> TestActor {
    TestActor::new("bea").with_group("builder")
}

/// Region `e` at (1,0,1)-(10,255,10): members are group `vip`, entry is
/// denied to non-members.
pub fn entry_region() -> Region {
    let mut members = Domain::new();
    members.add_group("vip");
    Region::cuboid(rid("e"), BlockPos::new(1, 0, 1), BlockPos::new(10, 255, 10))
        .with_members(members)
        .with_flag(builtin::ENTRY, State::Deny)
        .with_flag(builtin::ENTRY_GROUP, RegionGroup::NonMembers)
}

/// Region `x` at (-1,0,-1)-(-10,255,-10): owners are group `builder`,
/// exit is denied to non-owners.
pub fn exit_region() -> Region {
    let mut owners = Domain::new();
    owners.add_group("builder");
    Region::cuboid(rid("x"), BlockPos::new(-1, 0, -1), BlockPos::new(-10, 255, -10))
        .with_owners(owners)
        .with_flag(builtin::EXIT, State::Deny)
        .with_flag(builtin::EXIT_GROUP, RegionGroup::NonOwners)
}

/// Manager holding [`entry_region`], [`exit_region`] and an empty global
/// region.
pub fn scenario_manager() -> RegionManager {
    let manager = RegionManager::with_catalog(catalog());
    manager.set_regions([entry_region(), exit_region(), Region::global(rid(GLOBAL))]);
    manager
}

/// `depth` nested regions all covering the origin column: `c0` is the
/// root and carries `build = deny`; `c{i}` is parented to `c{i-1}`.
pub fn chain(depth: usize) -> Vec<Region> {
    (0..depth)
        .map(|i| {
            let region = Region::cuboid(
                rid(&format!("c{i}")),
                BlockPos::new(-8, 0, -8),
                BlockPos::new(8, 255, 8),
            );
            if i == 0 {
                region.with_flag(builtin::BUILD, State::Deny)
            } else {
                region.with_parent(rid(&format!("c{}", i - 1)))
            }
        })
        .collect()
}

/// `side * side` disjoint `size`-wide cuboids laid out on a grid starting
/// at the origin, with a one-block gap between neighbours. Every fourth
/// region denies pvp.
pub fn grid(side: i32, size: i32) -> Vec<Region> {
    let pitch = size + 1;
    let mut out = Vec::with_capacity((side * side).max(0) as usize);
    for gx in 0..side {
        for gz in 0..side {
            let (x, z) = (gx * pitch, gz * pitch);
            let mut region = Region::cuboid(
                rid(&format!("g{gx}_{gz}")),
                BlockPos::new(x, 0, z),
                BlockPos::new(x + size - 1, 255, z + size - 1),
            );
            if (gx + gz) % 4 == 0 {
                region = region.with_flag(builtin::PVP, State::Deny);
            }
            out.push(region);
        }
    }
    out
}
