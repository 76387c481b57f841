//! Core types and traits for the Bastion region protection engine.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by the rest of the workspace: identifiers, block
//! positions, membership [`Domain`]s, the [`Actor`] trait supplied by the
//! host, and the typed flag model with its [`FlagCatalog`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actor;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod flag;
pub mod id;
pub mod pos;

pub use actor::{Actor, Association};
pub use catalog::{builtin, FlagCatalog, FlagCatalogBuilder};
pub use domain::Domain;
pub use error::{FlagError, IdError};
pub use flag::{FlagDef, FlagKind, FlagValue, RegionGroup, State};
pub use id::{AccountId, FlagId, RegionId};
pub use pos::{BlockPos, BlockPos2};
