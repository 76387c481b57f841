//! Load and save glue between a [`RegionDatabase`] and a [`RegionManager`].

use bastion_engine::{ReconcileReport, RegionManager, RegionSnapshot};
use tracing::info;

use crate::database::RegionDatabase;
use crate::error::StoreError;

/// Load every region from `db` and publish them as the manager's region
/// set.
///
/// On error nothing is published and the manager keeps its previous set.
pub fn load_into(db: &dyn RegionDatabase, manager: &RegionManager) -> Result<ReconcileReport, StoreError> {
    let catalog = manager.catalog();
    let regions = db.load_all(&catalog)?;
    let report = manager.set_regions(regions);
    info!(
        store = db.name(),
        loaded = report.loaded,
        clean = report.is_clean(),
        generation = manager.generation(),
        "regions loaded into manager"
    );
    Ok(report)
}

/// Save the manager's current region set. Returns the number of regions
/// written.
pub fn save_from(db: &dyn RegionDatabase, manager: &RegionManager) -> Result<usize, StoreError> {
    save_snapshot(db, &manager.snapshot())
}

/// Save one published snapshot. Returns the number of regions written.
pub fn save_snapshot(db: &dyn RegionDatabase, snapshot: &RegionSnapshot) -> Result<usize, StoreError> {
    let regions = snapshot.regions();
    db.save_all(snapshot.catalog(), &regions)?;
    Ok(regions.len())
}
