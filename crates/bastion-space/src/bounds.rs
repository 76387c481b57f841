//! Axis-aligned bounding boxes used for index acceleration.

use bastion_core::BlockPos;

/// Inclusive axis-aligned box.
///
/// Only the spatial index consults bounding boxes. Containment decisions
/// always go through [`Shape::contains`](crate::Shape::contains).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Minimum corner (inclusive).
    pub min: BlockPos,
    /// Maximum corner (inclusive).
    pub max: BlockPos,
}

impl BoundingBox {
    /// Sentinel box covering every representable position.
    pub const WORLD: Self = Self {
        min: BlockPos::new(i32::MIN, i32::MIN, i32::MIN),
        max: BlockPos::new(i32::MAX, i32::MAX, i32::MAX),
    };

    /// Box spanning two arbitrary corners.
    pub fn from_corners(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Inclusive containment on all three axes.
    pub fn contains(&self, p: BlockPos) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Whether this is the [`WORLD`](Self::WORLD) sentinel.
    pub fn is_world(&self) -> bool {
        *self == Self::WORLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_normalized() {
        let b = BoundingBox::from_corners(BlockPos::new(5, 0, -1), BlockPos::new(-5, 9, 3));
        assert_eq!(b.min, BlockPos::new(-5, 0, -1));
        assert_eq!(b.max, BlockPos::new(5, 9, 3));
    }

    #[test]
    fn world_contains_extremes() {
        assert!(BoundingBox::WORLD.contains(BlockPos::new(i32::MIN, 0, i32::MAX)));
        assert!(BoundingBox::WORLD.is_world());
    }
}
