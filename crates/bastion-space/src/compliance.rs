//! Shape and index compliance test helpers.
//!
//! These functions check the contracts the rest of the workspace relies
//! on: bounding boxes never cut off contained positions, and the spatial
//! index never misses a shape that contains the queried point.

use bastion_core::BlockPos;

use crate::index::SpatialIndex;
use crate::shape::Shape;

/// Assert that every position contained by `shape` lies inside its
/// bounding box, scanning the box grown by two blocks on each side.
///
/// Panics if the box is wider than 64 blocks on any axis.
pub fn assert_bbox_covers_contents(shape: &Shape) {
    let bb = shape.bounding_box();
    assert!(!bb.is_world(), "cannot scan an unbounded shape");
    for (lo, hi) in [
        (bb.min.x, bb.max.x),
        (bb.min.y, bb.max.y),
        (bb.min.z, bb.max.z),
    ] {
        assert!(hi - lo <= 64, "shape too large to scan: {bb:?}");
    }
    for x in bb.min.x - 2..=bb.max.x + 2 {
        for y in bb.min.y - 2..=bb.max.y + 2 {
            for z in bb.min.z - 2..=bb.max.z + 2 {
                let p = BlockPos::new(x, y, z);
                if shape.contains(p) {
                    assert!(bb.contains(p), "{p} contained but outside {bb:?}");
                }
            }
        }
    }
}

/// Assert that for every probe point, each shape containing it is among
/// the index candidates. `shapes[i]` must have been inserted as key `i`.
pub fn assert_no_false_negatives(index: &SpatialIndex<usize>, shapes: &[Shape], probes: &[BlockPos]) {
    for &p in probes {
        let candidates = index.candidates(p);
        for (key, shape) in shapes.iter().enumerate() {
            if shape.contains(p) {
                assert!(
                    candidates.contains(&key),
                    "shape {key} contains {p} but is not a candidate"
                );
            }
        }
        let mut sorted = candidates.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), candidates.len(), "duplicate candidates at {p}");
    }
}
