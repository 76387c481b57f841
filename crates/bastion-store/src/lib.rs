//! Region persistence for Bastion.
//!
//! A [`RegionDatabase`] loads and saves one world's region set.
//! [`YamlRegionFile`] stores it as a YAML document written atomically;
//! [`MemoryRegionDatabase`] keeps it in memory. [`load_into`] and
//! [`save_from`] connect a store to a
//! [`RegionManager`](bastion_engine::RegionManager), and the [`Saver`]
//! moves saves off the mutation path.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod database;
pub mod document;
pub mod error;
pub mod marshal;
pub mod memory;
pub mod saver;
pub mod sync;
pub mod yaml;

pub use database::{RegionDatabase, RegionDifference};
pub use error::StoreError;
pub use memory::MemoryRegionDatabase;
pub use saver::Saver;
pub use sync::{load_into, save_from, save_snapshot};
pub use yaml::YamlRegionFile;
