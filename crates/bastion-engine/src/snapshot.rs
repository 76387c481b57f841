//! Immutable region arena.
//!
//! A [`RegionSnapshot`] is one published version of a world's region set:
//! the regions, their resolved parent links, and the spatial index over
//! them. Readers hold an `Arc<RegionSnapshot>` for the duration of a query;
//! writers clone the current snapshot, mutate the clone and publish it.
//! Regions are shared between versions through `Arc`, so a clone copies
//! slot handles and index buckets, never region data.

use std::sync::Arc;

use bastion_core::{BlockPos, FlagCatalog, FlagId, FlagValue, RegionId};
use bastion_space::SpatialIndex;
use indexmap::IndexMap;
use tracing::warn;

use crate::config::{DuplicatePolicy, IndexConfig, RemovalStrategy};
use crate::error::ManagerError;
use crate::region::Region;
use crate::resolve::ApplicableRegionSet;

/// Arena index of a region within one snapshot lineage.
///
/// Indices are stable while a region stays in the set and may be reused
/// after it is removed. They are not meaningful across a bulk replace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionIdx(u32);

impl RegionIdx {
    fn from_usize(i: usize) -> Self {
        debug_assert!(i <= u32::MAX as usize, "region arena overflow");
        Self(i as u32)
    }

    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Slot {
    region: Arc<Region>,
    parent: Option<RegionIdx>,
}

/// Outcome of a bulk replace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Regions in the published set.
    pub loaded: usize,
    /// Ids that appeared more than once; the last occurrence was kept.
    pub duplicates: Vec<RegionId>,
    /// `(child, parent)` links cleared because the parent is absent.
    pub dangling_parents: Vec<(RegionId, RegionId)>,
    /// `(child, parent)` links cleared because they would close a cycle.
    pub broken_cycles: Vec<(RegionId, RegionId)>,
    /// Flag values dropped because they did not fit the catalog.
    pub dropped_flags: usize,
}

impl ReconcileReport {
    /// Whether nothing had to be repaired.
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
            && self.dangling_parents.is_empty()
            && self.broken_cycles.is_empty()
            && self.dropped_flags == 0
    }
}

/// One published version of a region set.
#[derive(Clone, Debug)]
pub struct RegionSnapshot {
    catalog: Arc<FlagCatalog>,
    slots: Vec<Option<Slot>>,
    free: Vec<RegionIdx>,
    by_id: IndexMap<RegionId, RegionIdx>,
    index: SpatialIndex<RegionIdx>,
    generation: u64,
}

impl RegionSnapshot {
    /// An empty snapshot at generation 0.
    pub fn empty(catalog: Arc<FlagCatalog>, config: &IndexConfig) -> Self {
        Self {
            catalog,
            slots: Vec::new(),
            free: Vec::new(),
            by_id: IndexMap::new(),
            index: SpatialIndex::new(config.cell_shift, config.max_cells_per_entry),
            generation: 0,
        }
    }

    /// Build a snapshot from an unvalidated region list, repairing what
    /// can be repaired.
    ///
    /// Later duplicates replace earlier ones. Flag values that do not fit
    /// the catalog are dropped. Parent links are resolved in id order;
    /// links to absent regions and links that would close a cycle are
    /// cleared. Every repair is logged and counted in the report.
    pub fn build(
        catalog: Arc<FlagCatalog>,
        config: &IndexConfig,
        regions: impl IntoIterator<Item = Region>,
    ) -> (Self, ReconcileReport) {
        let mut report = ReconcileReport::default();
        let mut unique: IndexMap<RegionId, Region> = IndexMap::new();
        for mut region in regions {
            report.dropped_flags += strip_invalid_flags(&catalog, &mut region);
            if let Some(old) = unique.insert(region.id().clone(), region) {
                warn!(region = %old.id(), "duplicate region id, keeping the last occurrence");
                report.duplicates.push(old.id().clone());
            }
        }

        let mut snapshot = Self::empty(catalog, config);
        for (id, region) in unique {
            let idx = RegionIdx::from_usize(snapshot.slots.len());
            snapshot.slots.push(Some(Slot {
                region: Arc::new(region),
                parent: None,
            }));
            snapshot.by_id.insert(id, idx);
        }

        let mut order: Vec<(RegionId, RegionIdx)> =
            snapshot.by_id.iter().map(|(id, &idx)| (id.clone(), idx)).collect();
        order.sort_unstable();
        for (id, idx) in order {
            let Some(wanted) = snapshot.region_at(idx).and_then(|r| r.parent().cloned()) else {
                continue;
            };
            let link = match snapshot.by_id.get(&wanted).copied() {
                None => {
                    warn!(region = %id, parent = %wanted, "parent region not found, clearing link");
                    report.dangling_parents.push((id.clone(), wanted));
                    None
                }
                Some(pidx) if snapshot.would_cycle(idx, pidx) => {
                    warn!(region = %id, parent = %wanted, "parent link would be circular, clearing it");
                    report.broken_cycles.push((id.clone(), wanted));
                    None
                }
                Some(pidx) => Some(pidx),
            };
            if let Some(slot) = snapshot.slot_at_mut(idx) {
                slot.parent = link;
                if link.is_none() {
                    Arc::make_mut(&mut slot.region).set_parent(None);
                }
            }
        }

        let Self { slots, index, .. } = &mut snapshot;
        index.rebuild(slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()
                .map(|s| (RegionIdx::from_usize(i), s.region.shape()))
        }));
        report.loaded = snapshot.len();
        (snapshot, report)
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// Flag catalog regions in this snapshot are validated against.
    pub fn catalog(&self) -> &Arc<FlagCatalog> {
        &self.catalog
    }

    /// Publication counter; bumped by every successful mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Region by id. Lookup is case-insensitive.
    pub fn get(&self, id: &str) -> Option<&Arc<Region>> {
        self.idx_of(id)
            .and_then(|idx| self.slot_at(idx))
            .map(|slot| &slot.region)
    }

    /// Whether a region with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.idx_of(id).is_some()
    }

    /// Every region, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Region>> {
        self.slots.iter().flatten().map(|slot| &slot.region)
    }

    /// Every region, sorted by id.
    pub fn regions(&self) -> Vec<Arc<Region>> {
        let mut out: Vec<Arc<Region>> = self.iter().cloned().collect();
        out.sort_unstable_by(|a, b| a.id().cmp(b.id()));
        out
    }

    /// The region followed by its ancestors, nearest first. Empty if the
    /// id is unknown.
    pub fn lineage(&self, id: &str) -> Lineage<'_> {
        Lineage {
            snapshot: self,
            next: self.idx_of(id),
            remaining: self.slots.len(),
        }
    }

    /// Regions whose shape contains `point`.
    pub fn applicable(self: &Arc<Self>, point: BlockPos) -> ApplicableRegionSet {
        ApplicableRegionSet::at(Arc::clone(self), point)
    }

    /// The spatial index over this snapshot's arena.
    pub fn spatial_index(&self) -> &SpatialIndex<RegionIdx> {
        &self.index
    }

    pub(crate) fn region_at(&self, idx: RegionIdx) -> Option<&Region> {
        self.slot_at(idx).map(|slot| slot.region.as_ref())
    }

    pub(crate) fn lineage_at(&self, idx: RegionIdx) -> Lineage<'_> {
        Lineage {
            snapshot: self,
            next: Some(idx),
            remaining: self.slots.len(),
        }
    }

    fn slot_at(&self, idx: RegionIdx) -> Option<&Slot> {
        self.slots.get(idx.index()).and_then(Option::as_ref)
    }

    fn slot_at_mut(&mut self, idx: RegionIdx) -> Option<&mut Slot> {
        self.slots.get_mut(idx.index()).and_then(Option::as_mut)
    }

    fn idx_of(&self, id: &str) -> Option<RegionIdx> {
        match self.by_id.get(id) {
            Some(&idx) => Some(idx),
            None if id.bytes().any(|b| b.is_ascii_uppercase()) => {
                self.by_id.get(id.to_ascii_lowercase().as_str()).copied()
            }
            None => None,
        }
    }

    fn id_at(&self, idx: RegionIdx, raw: &str) -> Result<RegionId, ManagerError> {
        self.region_at(idx)
            .map(|r| r.id().clone())
            .ok_or_else(|| ManagerError::UnknownRegion { id: raw.to_owned() })
    }

    fn lookup(&self, id: &str) -> Result<RegionIdx, ManagerError> {
        self.idx_of(id)
            .ok_or_else(|| ManagerError::UnknownRegion { id: id.to_owned() })
    }

    /// Whether linking `child` under `parent` would close a cycle. The
    /// walk is bounded by the arena size; running out of steps counts as
    /// a cycle.
    fn would_cycle(&self, child: RegionIdx, parent: RegionIdx) -> bool {
        let mut cur = Some(parent);
        for _ in 0..=self.slots.len() {
            match cur {
                None => return false,
                Some(idx) if idx == child => return true,
                Some(idx) => cur = self.slot_at(idx).and_then(|slot| slot.parent),
            }
        }
        true
    }

    fn check_flags(&self, region: &Region) -> Result<(), ManagerError> {
        for (&flag, value) in region.flags() {
            self.catalog
                .validate(flag, value)
                .map_err(|source| ManagerError::Flag {
                    id: region.id().clone(),
                    source,
                })?;
        }
        Ok(())
    }

    // ── Mutations (on an unpublished clone) ────────────────────────

    pub(crate) fn bump_generation(&mut self) {
        self.generation += 1;
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Insert a region, or replace it under [`DuplicatePolicy::Replace`].
    /// Returns the replaced region.
    pub(crate) fn add(
        &mut self,
        region: Region,
        policy: DuplicatePolicy,
    ) -> Result<Option<Arc<Region>>, ManagerError> {
        self.check_flags(&region)?;
        let existing = self.by_id.get(region.id()).copied();
        if existing.is_some() && policy == DuplicatePolicy::Reject {
            return Err(ManagerError::DuplicateRegion {
                id: region.id().clone(),
            });
        }
        let parent = match region.parent() {
            None => None,
            Some(wanted) if wanted == region.id() => {
                return Err(ManagerError::CircularInheritance {
                    id: region.id().clone(),
                    parent: wanted.clone(),
                });
            }
            Some(wanted) => {
                let pidx = self.by_id.get(wanted).copied().ok_or_else(|| {
                    ManagerError::UnknownParent {
                        id: region.id().clone(),
                        parent: wanted.to_string(),
                    }
                })?;
                if existing.is_some_and(|idx| self.would_cycle(idx, pidx)) {
                    return Err(ManagerError::CircularInheritance {
                        id: region.id().clone(),
                        parent: wanted.clone(),
                    });
                }
                Some(pidx)
            }
        };

        let region = Arc::new(region);
        match existing {
            Some(idx) => {
                let Some(slot) = self.slot_at_mut(idx) else {
                    return Err(ManagerError::UnknownRegion {
                        id: region.id().to_string(),
                    });
                };
                slot.parent = parent;
                let replaced = std::mem::replace(&mut slot.region, Arc::clone(&region));
                self.index.remove(idx, replaced.shape());
                self.index.insert(idx, region.shape());
                Ok(Some(replaced))
            }
            None => {
                let idx = match self.free.pop() {
                    Some(idx) => idx,
                    None => {
                        self.slots.push(None);
                        RegionIdx::from_usize(self.slots.len() - 1)
                    }
                };
                self.index.insert(idx, region.shape());
                self.by_id.insert(region.id().clone(), idx);
                self.slots[idx.index()] = Some(Slot { region, parent });
                Ok(None)
            }
        }
    }

    /// Remove a region and relink its children per `strategy`.
    pub(crate) fn remove(&mut self, id: &str, strategy: RemovalStrategy) -> Option<Arc<Region>> {
        let idx = self.idx_of(id)?;
        let slot = self.slots.get_mut(idx.index())?.take()?;
        self.by_id.shift_remove(slot.region.id());
        self.index.remove(idx, slot.region.shape());
        self.free.push(idx);

        let (new_parent, new_parent_id) = match strategy {
            RemovalStrategy::UnsetParent => (None, None),
            RemovalStrategy::Reparent => (slot.parent, slot.region.parent().cloned()),
        };
        for child in self.slots.iter_mut().flatten() {
            if child.parent == Some(idx) {
                child.parent = new_parent;
                Arc::make_mut(&mut child.region).set_parent(new_parent_id.clone());
            }
        }
        Some(slot.region)
    }

    pub(crate) fn set_parent(&mut self, id: &str, parent: Option<&str>) -> Result<(), ManagerError> {
        let idx = self.lookup(id)?;
        let link = match parent {
            None => None,
            Some(wanted) => {
                let Some(pidx) = self.idx_of(wanted) else {
                    return Err(ManagerError::UnknownParent {
                        id: self.id_at(idx, id)?,
                        parent: wanted.to_owned(),
                    });
                };
                let parent_id = self.id_at(pidx, wanted)?;
                if self.would_cycle(idx, pidx) {
                    return Err(ManagerError::CircularInheritance {
                        id: self.id_at(idx, id)?,
                        parent: parent_id,
                    });
                }
                Some((pidx, parent_id))
            }
        };
        let slot = self
            .slot_at_mut(idx)
            .ok_or_else(|| ManagerError::UnknownRegion { id: id.to_owned() })?;
        slot.parent = link.as_ref().map(|(pidx, _)| *pidx);
        Arc::make_mut(&mut slot.region).set_parent(link.map(|(_, pid)| pid));
        Ok(())
    }

    /// Set or clear one flag. Returns the previous explicit value.
    pub(crate) fn set_flag(
        &mut self,
        id: &str,
        flag: FlagId,
        value: Option<FlagValue>,
    ) -> Result<Option<FlagValue>, ManagerError> {
        let idx = self.lookup(id)?;
        if let Some(value) = &value {
            if let Err(source) = self.catalog.validate(flag, value) {
                return Err(ManagerError::Flag {
                    id: self.id_at(idx, id)?,
                    source,
                });
            }
        }
        let mut previous = None;
        self.update(idx, |region| {
            previous = match value {
                Some(value) => region.set_flag(flag, value),
                None => region.clear_flag(flag),
            };
        });
        Ok(previous)
    }

    /// Apply an edit that touches neither the shape nor the parent link.
    pub(crate) fn edit(&mut self, id: &str, f: impl FnOnce(&mut Region)) -> Result<(), ManagerError> {
        let idx = self.lookup(id)?;
        self.update(idx, f);
        Ok(())
    }

    fn update(&mut self, idx: RegionIdx, f: impl FnOnce(&mut Region)) {
        if let Some(slot) = self.slot_at_mut(idx) {
            f(Arc::make_mut(&mut slot.region));
        }
    }
}

/// Iterator over a region and its ancestors, nearest first.
///
/// Bounded by the arena size, so it terminates even on a corrupted chain.
#[derive(Clone, Debug)]
pub struct Lineage<'a> {
    snapshot: &'a RegionSnapshot,
    next: Option<RegionIdx>,
    remaining: usize,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = &'a Region;

    fn next(&mut self) -> Option<&'a Region> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let slot = self.snapshot.slot_at(self.next?)?;
        self.next = slot.parent;
        Some(&slot.region)
    }
}

fn strip_invalid_flags(catalog: &FlagCatalog, region: &mut Region) -> usize {
    let bad: Vec<FlagId> = region
        .flags()
        .iter()
        .filter(|(flag, value)| catalog.validate(**flag, value).is_err())
        .map(|(flag, _)| *flag)
        .collect();
    for &flag in &bad {
        warn!(region = %region.id(), %flag, "dropping flag value that does not fit the catalog");
        region.clear_flag(flag);
    }
    bad.len()
}
