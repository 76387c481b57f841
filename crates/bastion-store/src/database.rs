//! The [`RegionDatabase`] trait implemented by every region store.

use std::sync::Arc;

use bastion_core::{FlagCatalog, RegionId};
use bastion_engine::Region;

use crate::error::StoreError;

/// Regions changed or removed since the last save.
#[derive(Clone, Debug, Default)]
pub struct RegionDifference {
    /// Regions added or modified, in their current state.
    pub changed: Vec<Arc<Region>>,
    /// Ids of regions removed.
    pub removed: Vec<RegionId>,
}

impl RegionDifference {
    /// Whether there is nothing to save.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Durable storage for one world's region set.
///
/// Loading returns regions with parent links carried as ids; links to
/// regions missing from the store are already cleared. Publishing the
/// result (and repairing anything else) is the manager's job, see
/// [`load_into`](crate::load_into).
///
/// # Thread Safety
///
/// Stores are shared with the background [`Saver`](crate::Saver), so
/// implementations must be `Send + Sync`.
pub trait RegionDatabase: Send + Sync {
    /// Human-readable store name, usually the world name.
    fn name(&self) -> &str;

    /// Load every region. Unknown flags are resolved against `catalog`.
    fn load_all(&self, catalog: &FlagCatalog) -> Result<Vec<Region>, StoreError>;

    /// Replace the stored set with `regions`.
    fn save_all(&self, catalog: &FlagCatalog, regions: &[Arc<Region>]) -> Result<(), StoreError>;

    /// Apply an incremental change.
    ///
    /// Stores that cannot do this return
    /// [`StoreError::DifferenceSaveUnsupported`]; callers fall back to
    /// [`save_all`](Self::save_all).
    fn save_changes(&self, catalog: &FlagCatalog, diff: &RegionDifference) -> Result<(), StoreError> {
        let _ = (catalog, diff);
        Err(StoreError::DifferenceSaveUnsupported {
            store: self.name().to_owned(),
        })
    }
}
