//! Region manager and flag resolution engine for Bastion.
//!
//! Provides the [`RegionManager`] that owns one world's region set and
//! answers "does this flag permit this actor here" queries against it.
//! Queries run lock-free against an immutable [`RegionSnapshot`];
//! mutations publish a new snapshot atomically.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod manager;
pub mod region;
pub mod resolve;
pub mod snapshot;

pub use config::{ConfigError, DuplicatePolicy, IndexConfig, ManagerConfig, RemovalStrategy};
pub use error::ManagerError;
pub use manager::RegionManager;
pub use region::Region;
pub use resolve::ApplicableRegionSet;
pub use snapshot::{Lineage, ReconcileReport, RegionIdx, RegionSnapshot};
