//! Bastion: spatial region protection for voxel worlds.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Bastion sub-crates. For most hosts, adding `bastion` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use bastion::prelude::*;
//!
//! // The host's player type.
//! struct Player {
//!     id: AccountId,
//!     name: String,
//!     groups: Vec<String>,
//! }
//!
//! impl Actor for Player {
//!     fn unique_id(&self) -> AccountId { self.id }
//!     fn name(&self) -> &str { &self.name }
//!     fn has_group(&self, group: &str) -> bool {
//!         self.groups.iter().any(|g| g == group)
//!     }
//! }
//!
//! let mut members = Domain::new();
//! members.add_group("vip");
//! let lounge = Region::cuboid(
//!     RegionId::new("lounge").unwrap(),
//!     BlockPos::new(1, 0, 1),
//!     BlockPos::new(10, 255, 10),
//! )
//! .with_members(members)
//! .with_flag(builtin::ENTRY, State::Deny)
//! .with_flag(builtin::ENTRY_GROUP, RegionGroup::NonMembers);
//!
//! let manager = RegionManager::with_catalog(Arc::new(FlagCatalog::builtin()));
//! manager.add_region(lounge).unwrap();
//!
//! let guest = Player { id: AccountId::random(), name: "guest".into(), groups: vec![] };
//! let vip = Player { id: AccountId::random(), name: "vee".into(), groups: vec!["vip".into()] };
//! let at = BlockPos::new(5, 64, 5);
//! assert!(manager.test_state(at, builtin::ENTRY, Some(&vip)));
//! assert!(!manager.test_state(at, builtin::ENTRY, Some(&guest)));
//!
//! // Persist and reload.
//! let db = MemoryRegionDatabase::new("world");
//! save_from(&db, &manager).unwrap();
//! let reloaded = RegionManager::with_catalog(manager.catalog());
//! load_into(&db, &reloaded).unwrap();
//! assert!(reloaded.has_region("lounge"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `bastion-core` | Ids, positions, flags, the flag catalog, domains, the `Actor` trait |
//! | [`space`] | `bastion-space` | Shapes and the spatial index |
//! | [`engine`] | `bastion-engine` | Regions, the manager, snapshots and resolution |
//! | [`store`] | `bastion-store` | Region databases, YAML files and the background saver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`bastion-core`).
///
/// Region and account ids, block positions, flag definitions and values,
/// the [`types::FlagCatalog`], [`types::Domain`] and the
/// [`types::Actor`] membership boundary.
pub use bastion_core as types;

/// Shapes and spatial indexing (`bastion-space`).
pub use bastion_space as space;

/// Region manager and resolution engine (`bastion-engine`).
///
/// [`engine::RegionManager`] owns one world's regions;
/// [`engine::ApplicableRegionSet`] answers flag queries at a point.
pub use bastion_engine as engine;

/// Persistence (`bastion-store`).
pub use bastion_store as store;

/// Common imports for typical Bastion usage.
///
/// ```rust
/// use bastion::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use bastion_core::{
        builtin, AccountId, Actor, Association, BlockPos, BlockPos2, Domain, FlagCatalog,
        FlagCatalogBuilder, FlagId, FlagKind, FlagValue, RegionGroup, RegionId, State,
    };

    // Shapes
    pub use bastion_space::Shape;

    // Engine
    pub use bastion_engine::{
        ApplicableRegionSet, ManagerConfig, ManagerError, Region, RegionManager, RegionSnapshot,
    };

    // Persistence
    pub use bastion_store::{
        load_into, save_from, MemoryRegionDatabase, RegionDatabase, Saver, StoreError,
        YamlRegionFile,
    };
}
