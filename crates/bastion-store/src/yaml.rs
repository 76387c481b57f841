//! YAML region file: one file per world, written atomically.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bastion_core::{FlagCatalog, RegionId};
use bastion_engine::Region;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::database::RegionDatabase;
use crate::document::RegionEntry;
use crate::error::StoreError;

const HEADER: &str = "\
# Bastion region file
#
# This file is rewritten whenever regions change. Edits made while the
# server is running will be overwritten.
#
# Keep backups before editing by hand.
";

/// Regions stored in a single YAML document under a `regions` key.
///
/// A missing file loads as an empty set. Entries that fail to decode are
/// logged and skipped so one bad region does not lose the rest.
/// Saves write a temporary sibling file and rename it over the target.
#[derive(Clone, Debug)]
pub struct YamlRegionFile {
    name: String,
    path: PathBuf,
}

impl YamlRegionFile {
    /// A store for the file at `path`. Nothing is read until
    /// [`load_all`](RegionDatabase::load_all).
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// The region file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn parse_error(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Parse {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn io_error(path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Write header and body to `tmp`, sync it, then rename it over the
    /// region file.
    fn replace_with(&self, tmp: &Path, body: &str) -> Result<(), StoreError> {
        let mut file = fs::File::create(tmp).map_err(|e| Self::io_error(tmp, e))?;
        file.write_all(HEADER.as_bytes())
            .and_then(|()| file.write_all(body.as_bytes()))
            .and_then(|()| file.sync_all())
            .map_err(|e| Self::io_error(tmp, e))?;
        drop(file);
        fs::rename(tmp, &self.path).map_err(|source| StoreError::Rename {
            from: tmp.to_path_buf(),
            to: self.path.clone(),
            source,
        })
    }

    fn decode_entry(key: &Value, raw: &Value, catalog: &FlagCatalog) -> Result<Region, String> {
        let raw_id = match key {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => return Err(format!("region key {other:?} is not a string")),
        };
        let id = RegionId::new(&raw_id).map_err(|e| e.to_string())?;
        let entry: RegionEntry = serde_yaml::from_value(raw.clone()).map_err(|e| e.to_string())?;
        entry.into_region(id, catalog).map_err(|e| e.to_string())
    }
}

/// Raw entry text for log messages, one level indented.
fn dump(raw: &Value) -> String {
    match serde_yaml::to_string(raw) {
        Ok(text) => text.lines().map(|l| format!("\t{l}")).collect::<Vec<_>>().join("\n"),
        Err(_) => "<unprintable entry>".to_owned(),
    }
}

impl RegionDatabase for YamlRegionFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_all(&self, catalog: &FlagCatalog) -> Result<Vec<Region>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(store = %self.name, path = %self.path.display(), "no region file, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: Value =
            serde_yaml::from_str(&text).map_err(|e| self.parse_error(e.to_string()))?;
        let entries: Mapping = match document {
            Value::Null => return Ok(Vec::new()),
            Value::Mapping(mut top) => match top.remove("regions") {
                None | Some(Value::Null) => return Ok(Vec::new()),
                Some(Value::Mapping(entries)) => entries,
                Some(_) => return Err(self.parse_error("'regions' is not a mapping")),
            },
            _ => return Err(self.parse_error("top level is not a mapping")),
        };

        let mut regions = Vec::with_capacity(entries.len());
        for (key, raw) in &entries {
            match Self::decode_entry(key, raw, catalog) {
                Ok(region) => regions.push(region),
                Err(reason) => warn!(
                    store = %self.name,
                    ?key,
                    %reason,
                    "skipping region that failed to load:\n{}",
                    dump(raw)
                ),
            }
        }

        let known: BTreeSet<RegionId> = regions.iter().map(|r| r.id().clone()).collect();
        for region in &mut regions {
            let dangling = region.parent().is_some_and(|p| !known.contains(p));
            if dangling {
                warn!(
                    store = %self.name,
                    region = %region.id(),
                    parent = ?region.parent(),
                    "parent region not found, clearing parent"
                );
                region.set_parent(None);
            }
        }

        debug!(store = %self.name, count = regions.len(), "regions loaded");
        Ok(regions)
    }

    fn save_all(&self, catalog: &FlagCatalog, regions: &[Arc<Region>]) -> Result<(), StoreError> {
        let mut sorted: Vec<&Arc<Region>> = regions.iter().collect();
        sorted.sort_by(|a, b| a.id().cmp(b.id()));
        let entries: Mapping = sorted
            .iter()
            .map(|r| {
                let entry = serde_yaml::to_value(RegionEntry::from_region(r, catalog))
                    .map_err(|e| StoreError::Serialize { reason: e.to_string() })?;
                Ok((Value::String(r.id().to_string()), entry))
            })
            .collect::<Result<_, StoreError>>()?;
        let mut document = Mapping::new();
        document.insert(Value::String("regions".to_owned()), Value::Mapping(entries));
        let body = serde_yaml::to_string(&document)
            .map_err(|e| StoreError::Serialize { reason: e.to_string() })?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Self::io_error(dir, e))?;
        }
        let tmp = self.tmp_path();
        if let Err(e) = self.replace_with(&tmp, &body) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %cleanup, "could not remove temporary region file");
                }
            }
            return Err(e);
        }

        info!(store = %self.name, path = %self.path.display(), count = regions.len(), "regions saved");
        Ok(())
    }
}
