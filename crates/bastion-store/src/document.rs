//! Serde schema of a region file entry.
//!
//! ```yaml
//! regions:
//!   spawn:
//!     type: cuboid          # cuboid | poly2d | global
//!     min: {x: 0, y: 0, z: 0}
//!     max: {x: 15, y: 255, z: 15}
//!     priority: 10
//!     flags: {build: deny, build-group: nonmembers}
//!     owners: {players: [], unique-ids: [], groups: [admins]}
//!     members: {}
//!     parent: town
//! ```
//!
//! Entries are decoded one at a time so a malformed entry only loses
//! itself. Conversion into a [`Region`] reports what was wrong as an
//! [`EntryError`].

use std::str::FromStr;

use bastion_core::{AccountId, BlockPos, BlockPos2, Domain, FlagCatalog, RegionId};
use bastion_engine::Region;
use bastion_space::Shape;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Mapping;
use tracing::warn;

use crate::marshal;

/// Why an entry could not become a region.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    /// `type` is not one of the known shape names.
    #[error("unknown region type '{0}'")]
    UnknownType(String),
    /// A field required by the shape type is absent.
    #[error("missing '{0}'")]
    Missing(&'static str),
    /// A polygon without vertices.
    #[error("polygon has no points")]
    EmptyPolygon,
}

/// Block coordinates. Fractional values are floored on load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point3 {
    /// East-west.
    #[serde(deserialize_with = "block_coord")]
    pub x: i32,
    /// Height.
    #[serde(deserialize_with = "block_coord")]
    pub y: i32,
    /// North-south.
    #[serde(deserialize_with = "block_coord")]
    pub z: i32,
}

/// Horizontal polygon vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point2 {
    /// East-west.
    #[serde(deserialize_with = "block_coord")]
    pub x: i32,
    /// North-south.
    #[serde(deserialize_with = "block_coord")]
    pub z: i32,
}

fn block_coord<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let raw = f64::deserialize(d)?.floor();
    if raw < f64::from(i32::MIN) || raw > f64::from(i32::MAX) || raw.is_nan() {
        return Err(serde::de::Error::custom(format!("coordinate {raw} out of range")));
    }
    Ok(raw as i32)
}

impl From<BlockPos> for Point3 {
    fn from(p: BlockPos) -> Self {
        Self { x: p.x, y: p.y, z: p.z }
    }
}

impl From<Point3> for BlockPos {
    fn from(p: Point3) -> Self {
        BlockPos::new(p.x, p.y, p.z)
    }
}

/// Owners or members list. Empty lists are omitted when writing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DomainEntry {
    /// Legacy player names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub players: Vec<String>,
    /// Account ids, hyphenated.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unique_ids: Vec<String>,
    /// Permission groups.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl DomainEntry {
    /// Encode a domain; lists come out sorted.
    pub fn from_domain(domain: &Domain) -> Self {
        Self {
            players: domain.player_names().map(str::to_owned).collect(),
            unique_ids: domain.unique_ids().map(ToString::to_string).collect(),
            groups: domain.groups().map(str::to_owned).collect(),
        }
    }

    /// Decode into a domain. Unparseable unique ids are skipped with a
    /// warning.
    pub fn into_domain(self, region: &RegionId) -> Domain {
        let mut domain = Domain::new();
        for name in &self.players {
            domain.add_player_name(name);
        }
        for raw in &self.unique_ids {
            match AccountId::from_str(raw) {
                Ok(id) => domain.add_player_id(id),
                Err(e) => warn!(%region, error = %e, "skipping unparseable unique id"),
            }
        }
        for group in &self.groups {
            domain.add_group(group);
        }
        domain
    }
}

/// One region as stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegionEntry {
    /// `cuboid`, `poly2d` or `global`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Cuboid corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Point3>,
    /// Cuboid corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Point3>,
    /// Polygon floor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_y: Option<i32>,
    /// Polygon ceiling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_y: Option<i32>,
    /// Polygon vertices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point2>>,
    /// Required on load.
    #[serde(default)]
    pub priority: Option<i32>,
    /// Flag values by name.
    #[serde(default)]
    pub flags: Option<Mapping>,
    /// Owners.
    #[serde(default)]
    pub owners: Option<DomainEntry>,
    /// Members.
    #[serde(default)]
    pub members: Option<DomainEntry>,
    /// Parent region id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl RegionEntry {
    /// Encode a region. Flags are written by catalog name.
    pub fn from_region(region: &Region, catalog: &FlagCatalog) -> Self {
        let mut entry = Self {
            kind: region.shape().type_name().to_owned(),
            min: None,
            max: None,
            min_y: None,
            max_y: None,
            points: None,
            priority: Some(region.priority()),
            flags: Some(marshal::marshal(catalog, region.flags())),
            owners: Some(DomainEntry::from_domain(region.owners())),
            members: Some(DomainEntry::from_domain(region.members())),
            parent: region.parent().map(ToString::to_string),
        };
        match region.shape() {
            Shape::Cuboid(c) => {
                entry.min = Some(c.min().into());
                entry.max = Some(c.max().into());
            }
            Shape::Polygon(p) => {
                entry.min_y = Some(p.min_y());
                entry.max_y = Some(p.max_y());
                entry.points = Some(
                    p.points()
                        .iter()
                        .map(|v| Point2 { x: v.x, z: v.z })
                        .collect(),
                );
            }
            Shape::Global => {}
        }
        entry
    }

    /// Decode into a region. The parent link is carried as an id only; an
    /// invalid parent id is dropped with a warning.
    pub fn into_region(self, id: RegionId, catalog: &FlagCatalog) -> Result<Region, EntryError> {
        let shape = match self.kind.as_str() {
            "cuboid" => {
                let min = self.min.ok_or(EntryError::Missing("min"))?;
                let max = self.max.ok_or(EntryError::Missing("max"))?;
                Shape::cuboid(min.into(), max.into())
            }
            "poly2d" => {
                let min_y = self.min_y.ok_or(EntryError::Missing("min-y"))?;
                let max_y = self.max_y.ok_or(EntryError::Missing("max-y"))?;
                let points = self
                    .points
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| BlockPos2::new(p.x, p.z))
                    .collect();
                Shape::polygon(points, min_y, max_y).map_err(|_| EntryError::EmptyPolygon)?
            }
            "global" => Shape::Global,
            other => return Err(EntryError::UnknownType(other.to_owned())),
        };
        let priority = self.priority.ok_or(EntryError::Missing("priority"))?;

        let mut region = Region::new(id, shape).with_priority(priority);
        if let Some(flags) = &self.flags {
            region.set_flags(marshal::unmarshal(catalog, region.id(), flags));
        }
        if let Some(owners) = self.owners {
            let owners = owners.into_domain(region.id());
            region.set_owners(owners);
        }
        if let Some(members) = self.members {
            let members = members.into_domain(region.id());
            region.set_members(members);
        }
        if let Some(raw) = self.parent {
            match RegionId::new(&raw) {
                Ok(parent) => region.set_parent(Some(parent)),
                Err(e) => warn!(region = %region.id(), parent = raw, error = %e, "ignoring invalid parent id"),
            }
        }
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{builtin, State};

    fn rid(s: &str) -> RegionId {
        RegionId::new(s).unwrap()
    }

    fn decode(text: &str) -> Result<Region, EntryError> {
        let entry: RegionEntry = serde_yaml::from_str(text).unwrap();
        entry.into_region(rid("r"), &FlagCatalog::builtin())
    }

    #[test]
    fn cuboid_corners_are_normalized_and_floored() {
        let region = decode(
            "type: cuboid\n\
             min: {x: 10.7, y: 255, z: 10}\n\
             max: {x: 1, y: 0, z: 1}\n\
             priority: 2\n",
        )
        .unwrap();
        let Shape::Cuboid(c) = region.shape() else {
            panic!("expected cuboid");
        };
        assert_eq!(c.min(), BlockPos::new(1, 0, 1));
        assert_eq!(c.max(), BlockPos::new(10, 255, 10));
        assert_eq!(region.priority(), 2);
    }

    #[test]
    fn missing_fields_are_reported() {
        assert_eq!(
            decode("type: cuboid\nmin: {x: 0, y: 0, z: 0}\npriority: 0\n"),
            Err(EntryError::Missing("max"))
        );
        assert_eq!(decode("type: global\n"), Err(EntryError::Missing("priority")));
        assert_eq!(
            decode("type: sphere\npriority: 0\n"),
            Err(EntryError::UnknownType("sphere".into()))
        );
        assert_eq!(
            decode("type: poly2d\nmin-y: 0\nmax-y: 5\npriority: 0\n"),
            Err(EntryError::EmptyPolygon)
        );
    }

    #[test]
    fn domains_skip_bad_unique_ids() {
        let region = decode(
            "type: global\n\
             priority: 0\n\
             owners:\n  unique-ids: [not-a-uuid, 0f8b7c3e-4b8a-4a3e-9d63-2f6a1d7b9e11]\n  players: [Steve, '']\n\
             members:\n  groups: [VIP]\n\
             flags: {pvp: deny}\n\
             parent: Town\n",
        )
        .unwrap();
        assert_eq!(region.owners().unique_ids().count(), 1);
        assert_eq!(region.owners().player_names().collect::<Vec<_>>(), ["Steve"]);
        assert!(region.members().contains_group("vip"));
        assert_eq!(region.flag(builtin::PVP), Some(&State::Deny.into()));
        assert_eq!(region.parent(), Some(&rid("town")));
    }

    #[test]
    fn empty_domains_serialize_as_empty_maps() {
        let region = Region::global(rid("g"));
        let text = serde_yaml::to_string(&RegionEntry::from_region(&region, &FlagCatalog::builtin()))
            .unwrap();
        assert!(text.contains("owners: {}"), "{text}");
        assert!(!text.contains("min"), "{text}");
        assert!(!text.contains("parent"), "{text}");
    }
}
