//! Region shapes: cuboid, polygonal prism and the unbounded global shape.

use bastion_core::{BlockPos, BlockPos2};

use crate::bounds::BoundingBox;
use crate::error::ShapeError;

/// Volume occupied by a region.
///
/// A tagged variant with a uniform [`contains`](Self::contains) /
/// [`bounding_box`](Self::bounding_box) surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Axis-aligned box.
    Cuboid(Cuboid),
    /// Vertical prism over a 2D polygon.
    Polygon(Polygon),
    /// Unbounded; contains every position.
    Global,
}

impl Shape {
    /// Cuboid spanning two arbitrary corners.
    pub fn cuboid(a: BlockPos, b: BlockPos) -> Self {
        Self::Cuboid(Cuboid::new(a, b))
    }

    /// Polygonal prism. See [`Polygon::new`].
    pub fn polygon(points: Vec<BlockPos2>, min_y: i32, max_y: i32) -> Result<Self, ShapeError> {
        Polygon::new(points, min_y, max_y).map(Self::Polygon)
    }

    /// Authoritative containment test.
    pub fn contains(&self, p: BlockPos) -> bool {
        match self {
            Self::Cuboid(c) => c.contains(p),
            Self::Polygon(poly) => poly.contains(p),
            Self::Global => true,
        }
    }

    /// Bounding box for index acceleration. [`BoundingBox::WORLD`] for global.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Self::Cuboid(c) => c.bounding_box(),
            Self::Polygon(poly) => poly.bounds,
            Self::Global => BoundingBox::WORLD,
        }
    }

    /// Whether this is the unbounded global shape.
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    /// Short type name as written in region files.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Cuboid(_) => "cuboid",
            Self::Polygon(_) => "poly2d",
            Self::Global => "global",
        }
    }
}

/// Axis-aligned box with inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cuboid {
    min: BlockPos,
    max: BlockPos,
}

impl Cuboid {
    /// Box spanning two arbitrary corners; corners are normalized.
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> BlockPos {
        self.min
    }

    /// Maximum corner.
    pub fn max(&self) -> BlockPos {
        self.max
    }

    /// Inclusive on every face.
    pub fn contains(&self, p: BlockPos) -> bool {
        self.bounding_box().contains(p)
    }

    /// Same extent as the cuboid itself.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            min: self.min,
            max: self.max,
        }
    }
}

/// Vertical prism: a polygon on the (x, z) plane extruded from `min_y` to
/// `max_y` inclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<BlockPos2>,
    min_y: i32,
    max_y: i32,
    bounds: BoundingBox,
}

impl Polygon {
    /// Build a prism. The vertical range is normalized so `min_y <= max_y`.
    ///
    /// Polygons with one or two points are accepted (old region files
    /// contain them) but contain nothing.
    pub fn new(points: Vec<BlockPos2>, min_y: i32, max_y: i32) -> Result<Self, ShapeError> {
        let first = *points.first().ok_or(ShapeError::EmptyPolygon)?;
        let (min_y, max_y) = (min_y.min(max_y), min_y.max(max_y));
        let (mut lo, mut hi) = (first, first);
        for p in &points {
            lo = BlockPos2::new(lo.x.min(p.x), lo.z.min(p.z));
            hi = BlockPos2::new(hi.x.max(p.x), hi.z.max(p.z));
        }
        Ok(Self {
            bounds: BoundingBox {
                min: BlockPos::new(lo.x, min_y, lo.z),
                max: BlockPos::new(hi.x, max_y, hi.z),
            },
            points,
            min_y,
            max_y,
        })
    }

    /// Vertices in the order given.
    pub fn points(&self) -> &[BlockPos2] {
        &self.points
    }

    /// Lowest contained y.
    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Highest contained y.
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Even-odd test on the horizontal projection; vertices and edges are
    /// inside.
    pub fn contains(&self, p: BlockPos) -> bool {
        if !self.bounds.contains(p) || self.points.len() < 3 {
            return false;
        }
        // Edge products of full-range coordinates need more than 64 bits.
        let (tx, tz) = (i128::from(p.x), i128::from(p.z));
        let n = self.points.len();
        let mut inside = false;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + n - 1) % n];
            if a.x == p.x && a.z == p.z {
                return true;
            }
            let (lo, hi) = if a.x <= b.x { (a, b) } else { (b, a) };
            let (x1, z1) = (i128::from(lo.x), i128::from(lo.z));
            let (x2, z2) = (i128::from(hi.x), i128::from(hi.z));
            if tx < x1 || tx > x2 {
                continue;
            }
            // Sign of (tz - edge_z(tx)) scaled by the edge's x extent.
            let cross = (tz - z1) * (x2 - x1) - (z2 - z1) * (tx - x1);
            if cross == 0 {
                if (z1 <= tz) == (tz <= z2) {
                    return true;
                }
            } else if cross < 0 && x1 != tx {
                // Half-open in x so a shared vertex is counted once.
                inside = !inside;
            }
        }
        inside
    }
}
