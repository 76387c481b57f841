//! Errors returned by [`RegionManager`](crate::RegionManager) mutations.

use bastion_core::{FlagError, RegionId};

/// A rejected mutation. The published region set is unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ManagerError {
    /// A region with this id already exists and the duplicate policy is
    /// [`Reject`](crate::DuplicatePolicy::Reject).
    #[error("region '{id}' already exists")]
    DuplicateRegion {
        /// The conflicting id.
        id: RegionId,
    },
    /// No region with this id.
    #[error("no region named '{id}'")]
    UnknownRegion {
        /// The id as given.
        id: String,
    },
    /// The requested parent is not in the region set.
    #[error("region '{id}' names unknown parent '{parent}'")]
    UnknownParent {
        /// The child region.
        id: RegionId,
        /// The parent id as given.
        parent: String,
    },
    /// Linking would close a cycle in the parent chain.
    #[error("making '{parent}' the parent of '{id}' would create circular inheritance")]
    CircularInheritance {
        /// The child region.
        id: RegionId,
        /// The rejected parent.
        parent: RegionId,
    },
    /// A flag value does not fit the catalog.
    #[error("region '{id}': {source}")]
    Flag {
        /// The region being modified.
        id: RegionId,
        /// What was wrong with the flag.
        #[source]
        source: FlagError,
    },
}
