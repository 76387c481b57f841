//! The per-world region manager.
//!
//! [`RegionManager`] publishes an immutable [`RegionSnapshot`] through an
//! [`ArcSwap`]. Queries load the current snapshot without locking and run
//! entirely against it. Mutations are serialized by a mutex: each clones
//! the current snapshot, applies one change, bumps the generation and
//! publishes the result with a single atomic store. A mutation that fails
//! publishes nothing.

use std::sync::Arc;

use arc_swap::ArcSwap;
use bastion_core::{Actor, BlockPos, Domain, FlagCatalog, FlagId, FlagValue};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::{ConfigError, ManagerConfig, RemovalStrategy};
use crate::error::ManagerError;
use crate::region::Region;
use crate::resolve::ApplicableRegionSet;
use crate::snapshot::{ReconcileReport, RegionSnapshot};

/// Owns the region set of one world.
pub struct RegionManager {
    config: ManagerConfig,
    current: ArcSwap<RegionSnapshot>,
    write_lock: Mutex<()>,
}

// Compile-time assertion: RegionManager must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<RegionManager>();
};

impl RegionManager {
    /// Create an empty manager. Fails if `config` is invalid.
    pub fn new(catalog: Arc<FlagCatalog>, config: ManagerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let empty = RegionSnapshot::empty(catalog, &config.index);
        Ok(Self {
            config,
            current: ArcSwap::from_pointee(empty),
            write_lock: Mutex::new(()),
        })
    }

    /// Create an empty manager with the default configuration.
    pub fn with_catalog(catalog: Arc<FlagCatalog>) -> Self {
        let config = ManagerConfig::default();
        let empty = RegionSnapshot::empty(catalog, &config.index);
        Self {
            config,
            current: ArcSwap::from_pointee(empty),
            write_lock: Mutex::new(()),
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The flag catalog regions are validated against.
    pub fn catalog(&self) -> Arc<FlagCatalog> {
        Arc::clone(self.current.load().catalog())
    }

    /// The current snapshot. It stays valid, and unchanged, for as long as
    /// the caller holds it.
    pub fn snapshot(&self) -> Arc<RegionSnapshot> {
        self.current.load_full()
    }

    /// Generation of the current snapshot.
    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Add a region. See [`DuplicatePolicy`](crate::DuplicatePolicy) for
    /// what happens when the id is taken; the replaced region is returned.
    pub fn add_region(&self, region: Region) -> Result<Option<Arc<Region>>, ManagerError> {
        let id = region.id().clone();
        let policy = self.config.duplicate_policy;
        let replaced = self.mutate(|snap| snap.add(region, policy))?;
        debug!(region = %id, replaced = replaced.is_some(), "region added");
        Ok(replaced)
    }

    /// Remove a region using the configured
    /// [`RemovalStrategy`](crate::RemovalStrategy). `None` if absent.
    pub fn remove_region(&self, id: &str) -> Option<Arc<Region>> {
        self.remove_region_with(id, self.config.removal_strategy)
    }

    /// Remove a region, handling its children per `strategy`.
    pub fn remove_region_with(&self, id: &str, strategy: RemovalStrategy) -> Option<Arc<Region>> {
        let _guard = self.write_lock.lock();
        let current = self.current.load();
        if !current.contains(id) {
            return None;
        }
        let mut next = RegionSnapshot::clone(&current);
        let removed = next.remove(id, strategy)?;
        next.bump_generation();
        self.current.store(Arc::new(next));
        debug!(region = %removed.id(), ?strategy, "region removed");
        Some(removed)
    }

    /// Link `id` under `parent`, or make it a root with `None`.
    pub fn set_parent(&self, id: &str, parent: Option<&str>) -> Result<(), ManagerError> {
        self.mutate(|snap| snap.set_parent(id, parent))?;
        debug!(region = id, parent = ?parent, "parent changed");
        Ok(())
    }

    /// Set (`Some`) or clear (`None`) one flag. Returns the previous
    /// explicit value.
    pub fn set_flag(
        &self,
        id: &str,
        flag: FlagId,
        value: Option<FlagValue>,
    ) -> Result<Option<FlagValue>, ManagerError> {
        let previous = self.mutate(|snap| snap.set_flag(id, flag, value))?;
        debug!(region = id, %flag, "flag changed");
        Ok(previous)
    }

    /// Change a region's priority.
    pub fn set_priority(&self, id: &str, priority: i32) -> Result<(), ManagerError> {
        self.mutate(|snap| snap.edit(id, |r| r.set_priority(priority)))?;
        debug!(region = id, priority, "priority changed");
        Ok(())
    }

    /// Replace a region's owners.
    pub fn set_owners(&self, id: &str, owners: Domain) -> Result<(), ManagerError> {
        self.mutate(|snap| snap.edit(id, |r| r.set_owners(owners)))?;
        debug!(region = id, "owners changed");
        Ok(())
    }

    /// Replace a region's members.
    pub fn set_members(&self, id: &str, members: Domain) -> Result<(), ManagerError> {
        self.mutate(|snap| snap.edit(id, |r| r.set_members(members)))?;
        debug!(region = id, "members changed");
        Ok(())
    }

    /// Atomically replace the whole region set.
    ///
    /// Input problems are repaired rather than rejected: see
    /// [`RegionSnapshot::build`]. Readers see either the old set or the
    /// complete new one.
    pub fn set_regions(&self, regions: impl IntoIterator<Item = Region>) -> ReconcileReport {
        let _guard = self.write_lock.lock();
        let current = self.current.load();
        let (mut next, report) = RegionSnapshot::build(
            Arc::clone(current.catalog()),
            &self.config.index,
            regions,
        );
        next.set_generation(current.generation() + 1);
        let generation = next.generation();
        self.current.store(Arc::new(next));
        info!(
            loaded = report.loaded,
            duplicates = report.duplicates.len(),
            dangling_parents = report.dangling_parents.len(),
            broken_cycles = report.broken_cycles.len(),
            dropped_flags = report.dropped_flags,
            generation,
            "region set replaced"
        );
        report
    }

    /// Host-facing name for [`set_regions`](Self::set_regions), used when
    /// publishing a freshly loaded region set.
    pub fn reconcile(&self, regions: impl IntoIterator<Item = Region>) -> ReconcileReport {
        self.set_regions(regions)
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut RegionSnapshot) -> Result<T, ManagerError>,
    ) -> Result<T, ManagerError> {
        let _guard = self.write_lock.lock();
        let mut next = RegionSnapshot::clone(&self.current.load());
        let out = op(&mut next)?;
        next.bump_generation();
        self.current.store(Arc::new(next));
        Ok(out)
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// Region by id (case-insensitive).
    pub fn get_region(&self, id: &str) -> Option<Arc<Region>> {
        self.current.load().get(id).cloned()
    }

    /// Whether a region with this id exists.
    pub fn has_region(&self, id: &str) -> bool {
        self.current.load().contains(id)
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    /// Whether there are no regions.
    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Every region, sorted by id.
    pub fn regions(&self) -> Vec<Arc<Region>> {
        self.current.load().regions()
    }

    /// Regions containing `point`, bound to the current snapshot.
    pub fn get_applicable_regions(&self, point: BlockPos) -> ApplicableRegionSet {
        self.snapshot().applicable(point)
    }

    /// Resolve `flag` at `point` for `actor`.
    pub fn resolve(
        &self,
        point: BlockPos,
        flag: FlagId,
        actor: Option<&dyn Actor>,
    ) -> Option<FlagValue> {
        self.get_applicable_regions(point).query_value(actor, flag)
    }

    /// Whether `flag` permits `actor` at `point`.
    pub fn test_state(&self, point: BlockPos, flag: FlagId, actor: Option<&dyn Actor>) -> bool {
        self.get_applicable_regions(point).test_state(actor, flag)
    }
}

impl std::fmt::Debug for RegionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.current.load();
        f.debug_struct("RegionManager")
            .field("regions", &current.len())
            .field("generation", &current.generation())
            .finish_non_exhaustive()
    }
}
