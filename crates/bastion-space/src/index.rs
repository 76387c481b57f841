//! Column-bucketed spatial index.
//!
//! [`SpatialIndex`] maps square columns of the (x, z) plane to the keys
//! whose bounding-box footprint overlaps them. A point query visits a
//! single column plus the always-candidate list, so lookup cost depends
//! on local region density, not on the size of the world.
//!
//! The index answers "which shapes might contain this point". Callers
//! must filter the candidates with [`Shape::contains`]; false positives
//! are expected, false negatives never happen.

use std::collections::HashMap;

use bastion_core::BlockPos;
use smallvec::SmallVec;

use crate::shape::Shape;

/// Default column width exponent: 16x16 block columns.
pub const DEFAULT_CELL_SHIFT: u8 = 4;

/// Default maximum number of columns one entry may occupy before it is
/// moved to the always-candidate list.
pub const DEFAULT_MAX_CELLS_PER_ENTRY: usize = 4096;

/// Candidate list returned by [`SpatialIndex::candidates`].
pub type Candidates<K> = SmallVec<[K; 8]>;

type Column = (i32, i32);

/// Where an entry is filed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Footprint {
    /// Returned for every query.
    Always,
    /// Filed under every column in the inclusive ranges.
    Columns {
        x0: i32,
        x1: i32,
        z0: i32,
        z1: i32,
    },
}

/// Spatial index over keys of type `K` (typically arena indices).
///
/// The index does not own shapes. [`remove`](Self::remove) must be given
/// the same shape that was passed to [`insert`](Self::insert) for that key.
#[derive(Clone, Debug)]
pub struct SpatialIndex<K> {
    cell_shift: u8,
    max_cells_per_entry: usize,
    columns: HashMap<Column, SmallVec<[K; 4]>>,
    always: SmallVec<[K; 4]>,
    len: usize,
}

impl<K: Copy + Eq> Default for SpatialIndex<K> {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SHIFT, DEFAULT_MAX_CELLS_PER_ENTRY)
    }
}

impl<K: Copy + Eq> SpatialIndex<K> {
    /// Create an empty index with `2^cell_shift` wide columns.
    ///
    /// `cell_shift` is clamped to `0..=30`, `max_cells_per_entry` to at
    /// least 1.
    pub fn new(cell_shift: u8, max_cells_per_entry: usize) -> Self {
        Self {
            cell_shift: cell_shift.min(30),
            max_cells_per_entry: max_cells_per_entry.max(1),
            columns: HashMap::new(),
            always: SmallVec::new(),
            len: 0,
        }
    }

    /// File `key` under the footprint of `shape`.
    pub fn insert(&mut self, key: K, shape: &Shape) {
        match self.footprint(shape) {
            Footprint::Always => self.always.push(key),
            Footprint::Columns { x0, x1, z0, z1 } => {
                for cx in x0..=x1 {
                    for cz in z0..=z1 {
                        self.columns.entry((cx, cz)).or_default().push(key);
                    }
                }
            }
        }
        self.len += 1;
    }

    /// Remove `key`, previously inserted with `shape`. Returns whether
    /// the key was found.
    pub fn remove(&mut self, key: K, shape: &Shape) -> bool {
        let found = match self.footprint(shape) {
            Footprint::Always => remove_key(&mut self.always, key),
            Footprint::Columns { x0, x1, z0, z1 } => {
                let mut found = false;
                for cx in x0..=x1 {
                    for cz in z0..=z1 {
                        if let Some(bucket) = self.columns.get_mut(&(cx, cz)) {
                            found |= remove_key(bucket, key);
                            if bucket.is_empty() {
                                self.columns.remove(&(cx, cz));
                            }
                        }
                    }
                }
                found
            }
        };
        if found {
            self.len -= 1;
        }
        found
    }

    /// Keys whose footprint covers `point`, deduplicated, in filing order
    /// (always-candidates first).
    pub fn candidates(&self, point: BlockPos) -> Candidates<K> {
        let mut out: Candidates<K> = SmallVec::new();
        out.extend(self.always.iter().copied());
        if let Some(bucket) = self.columns.get(&self.column_of(point)) {
            for &key in bucket {
                if !out.contains(&key) {
                    out.push(key);
                }
            }
        }
        out
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.columns.clear();
        self.always.clear();
        self.len = 0;
    }

    /// Replace the contents with `entries`.
    pub fn rebuild<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, &'a Shape)>,
    {
        self.clear();
        for (key, shape) in entries {
            self.insert(key, shape);
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of occupied columns.
    pub fn cell_count(&self) -> usize {
        self.columns.len()
    }

    /// Column width exponent in effect.
    pub fn cell_shift(&self) -> u8 {
        self.cell_shift
    }

    fn column_of(&self, p: BlockPos) -> Column {
        (p.x >> self.cell_shift, p.z >> self.cell_shift)
    }

    fn footprint(&self, shape: &Shape) -> Footprint {
        if shape.is_global() {
            return Footprint::Always;
        }
        let bb = shape.bounding_box();
        let (x0, z0) = self.column_of(bb.min);
        let (x1, z1) = self.column_of(bb.max);
        let cells = (i64::from(x1) - i64::from(x0) + 1) * (i64::from(z1) - i64::from(z0) + 1);
        if cells > self.max_cells_per_entry as i64 {
            return Footprint::Always;
        }
        Footprint::Columns { x0, x1, z0, z1 }
    }
}

fn remove_key<K: Copy + Eq>(bucket: &mut SmallVec<[K; 4]>, key: K) -> bool {
    match bucket.iter().position(|&k| k == key) {
        Some(i) => {
            bucket.swap_remove(i);
            true
        }
        None => false,
    }
}
