//! In-memory [`RegionDatabase`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bastion_core::{FlagCatalog, RegionId};
use bastion_engine::Region;
use parking_lot::Mutex;

use crate::database::{RegionDatabase, RegionDifference};
use crate::error::StoreError;

/// Region store that keeps everything in memory.
///
/// Supports incremental saves. Intended for tests and for hosts that
/// manage persistence elsewhere. Save failures can be injected with
/// [`fail_saves`](Self::fail_saves).
#[derive(Debug, Default)]
pub struct MemoryRegionDatabase {
    name: String,
    regions: Mutex<BTreeMap<RegionId, Region>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryRegionDatabase {
    /// An empty store.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A store pre-populated with `regions`.
    pub fn with_regions(name: impl Into<String>, regions: impl IntoIterator<Item = Region>) -> Self {
        let db = Self::new(name);
        db.regions
            .lock()
            .extend(regions.into_iter().map(|r| (r.id().clone(), r)));
        db
    }

    /// Stored regions, sorted by id.
    pub fn regions(&self) -> Vec<Region> {
        self.regions.lock().values().cloned().collect()
    }

    /// Number of successful `save_all` / `save_changes` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    fn check_failing(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(StoreError::Io {
                path: format!("memory:{}", self.name).into(),
                source: std::io::Error::other("injected save failure"),
            });
        }
        Ok(())
    }
}

impl RegionDatabase for MemoryRegionDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_all(&self, _catalog: &FlagCatalog) -> Result<Vec<Region>, StoreError> {
        Ok(self.regions())
    }

    fn save_all(&self, _catalog: &FlagCatalog, regions: &[Arc<Region>]) -> Result<(), StoreError> {
        self.check_failing()?;
        let mut stored = self.regions.lock();
        stored.clear();
        stored.extend(regions.iter().map(|r| (r.id().clone(), Region::clone(r))));
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn save_changes(&self, _catalog: &FlagCatalog, diff: &RegionDifference) -> Result<(), StoreError> {
        self.check_failing()?;
        let mut stored = self.regions.lock();
        for id in &diff.removed {
            stored.remove(id);
        }
        for region in &diff.changed {
            stored.insert(region.id().clone(), Region::clone(region));
        }
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
