//! Benchmark profiles for the Bastion region engine.
//!
//! - [`reference_profile`]: 32x32 grid of 16-block plots (1024 regions)
//!   under a global region
//! - [`stress_profile`]: 128x128 grid (16K regions)
//! - [`nested_profile`]: deep parent chain over one area
//! - [`probe_points`]: deterministic query positions

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use bastion_core::BlockPos;
use bastion_engine::{Region, RegionManager};
use bastion_test_utils::fixtures::{self, rid};

/// Plot width used by the grid profiles.
pub const PLOT_SIZE: i32 = 16;

fn grid_manager(side: i32) -> RegionManager {
    let manager = RegionManager::with_catalog(fixtures::catalog());
    let mut regions = fixtures::grid(side, PLOT_SIZE);
    regions.push(Region::global(rid(fixtures::GLOBAL)));
    manager.set_regions(regions);
    manager
}

/// 32x32 plots with a global region: 1025 regions.
pub fn reference_profile() -> RegionManager {
    grid_manager(32)
}

/// 128x128 plots with a global region: 16385 regions.
pub fn stress_profile() -> RegionManager {
    grid_manager(128)
}

/// A `depth`-deep parent chain; only the root sets a flag.
pub fn nested_profile(depth: usize) -> RegionManager {
    let manager = RegionManager::with_catalog(fixtures::catalog());
    manager.set_regions(fixtures::chain(depth));
    manager
}

/// Side length in blocks covered by a grid profile with `side` plots.
pub fn grid_extent(side: i32) -> i32 {
    side * (PLOT_SIZE + 1)
}

/// `count` deterministic positions in `[0, extent)` on x and z.
pub fn probe_points(count: usize, extent: i32) -> Vec<BlockPos> {
    let extent = extent.max(1) as u64;
    (0..count as u64)
        .map(|i| {
            let x = (i.wrapping_mul(6364136223846793007) >> 17) % extent;
            let z = (i.wrapping_mul(1442695040888963407) >> 17) % extent;
            let y = (i.wrapping_mul(2862933555777941757) >> 17) % 256;
            BlockPos::new(x as i32, y as i32, z as i32)
        })
        .collect()
}
