//! Manager configuration, validation, and error types.
//!
//! [`ManagerConfig`] is the builder-input for a
//! [`RegionManager`](crate::RegionManager). It deserializes from the
//! kebab-case YAML a host embeds in its own configuration file; every
//! field is optional and falls back to [`Default`].

use bastion_space::{DEFAULT_CELL_SHIFT, DEFAULT_MAX_CELLS_PER_ENTRY};
use serde::Deserialize;

/// Largest accepted [`IndexConfig::cell_shift`] (65536-block columns).
pub const MAX_CELL_SHIFT: u8 = 16;

// ── DuplicatePolicy ────────────────────────────────────────────────

/// What [`add_region`](crate::RegionManager::add_region) does when the id
/// is already taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail with [`ManagerError::DuplicateRegion`](crate::ManagerError::DuplicateRegion).
    #[default]
    Reject,
    /// Replace the existing region. Children linked to it stay linked.
    Replace,
}

// ── RemovalStrategy ────────────────────────────────────────────────

/// What happens to the children of a removed region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemovalStrategy {
    /// Children become roots.
    #[default]
    UnsetParent,
    /// Children are linked to the removed region's own parent.
    Reparent,
}

// ── IndexConfig ────────────────────────────────────────────────────

/// Spatial index tuning.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IndexConfig {
    /// Column width exponent; columns are `2^cell_shift` blocks square.
    /// Default: 4.
    pub cell_shift: u8,
    /// Entries spanning more columns than this are checked on every
    /// query instead. Default: 4096.
    pub max_cells_per_entry: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cell_shift: DEFAULT_CELL_SHIFT,
            max_cells_per_entry: DEFAULT_MAX_CELLS_PER_ENTRY,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`ManagerConfig::validate()`] or parsing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `cell_shift` is above [`MAX_CELL_SHIFT`].
    #[error("index cell-shift {value} is above the maximum of {MAX_CELL_SHIFT}")]
    InvalidCellShift {
        /// The configured value.
        value: u8,
    },
    /// `max_cells_per_entry` is zero.
    #[error("index max-cells-per-entry must be at least 1")]
    ZeroMaxCells,
    /// The YAML could not be decoded.
    #[error("invalid manager config: {reason}")]
    Parse {
        /// Decoder message.
        reason: String,
    },
}

// ── ManagerConfig ──────────────────────────────────────────────────

/// Configuration for a [`RegionManager`](crate::RegionManager).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ManagerConfig {
    /// Behavior of `add_region` on an existing id. Default: reject.
    pub duplicate_policy: DuplicatePolicy,
    /// Default child handling for `remove_region`. Default: unset parent.
    pub removal_strategy: RemovalStrategy,
    /// Spatial index tuning.
    pub index: IndexConfig,
}

impl ManagerConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index.cell_shift > MAX_CELL_SHIFT {
            return Err(ConfigError::InvalidCellShift {
                value: self.index.cell_shift,
            });
        }
        if self.index.max_cells_per_entry == 0 {
            return Err(ConfigError::ZeroMaxCells);
        }
        Ok(())
    }

    /// Parse from YAML and validate. An empty document yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
                reason: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ManagerConfig::default();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.removal_strategy, RemovalStrategy::UnsetParent);
        assert_eq!(config.index.cell_shift, 4);
        assert_eq!(config.index.max_cells_per_entry, 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_kebab_case_yaml() {
        let config = ManagerConfig::from_yaml(
            "duplicate-policy: replace\n\
             removal-strategy: reparent\n\
             index:\n  cell-shift: 6\n",
        )
        .unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Replace);
        assert_eq!(config.removal_strategy, RemovalStrategy::Reparent);
        assert_eq!(config.index.cell_shift, 6);
        assert_eq!(config.index.max_cells_per_entry, 4096);
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(ManagerConfig::from_yaml("").unwrap(), ManagerConfig::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            ManagerConfig::from_yaml("index:\n  cell-shift: 17\n"),
            Err(ConfigError::InvalidCellShift { value: 17 })
        );
        assert_eq!(
            ManagerConfig::from_yaml("index:\n  max-cells-per-entry: 0\n"),
            Err(ConfigError::ZeroMaxCells)
        );
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = ManagerConfig::from_yaml("duplicate-policy: merge\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
