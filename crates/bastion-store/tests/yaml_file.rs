//! Integration test: YAML region files on disk.
//!
//! Round-trips a realistic region set, checks the load contract for
//! absent, empty and malformed documents, and the atomic save.

use std::fs;
use std::sync::Arc;

use bastion_core::{builtin, AccountId, BlockPos, BlockPos2, Domain, FlagCatalog, RegionGroup, State};
use bastion_engine::{Region, RegionManager};
use bastion_store::{
    load_into, save_from, RegionDatabase, RegionDifference, StoreError, YamlRegionFile,
};
use bastion_test_utils::fixtures::{self, rid};
use bastion_test_utils::init_tracing;

fn sample_regions() -> Vec<Region> {
    let mut owners = Domain::new();
    owners.add_player_name("Alex");
    owners.add_player_id(AccountId::random());
    owners.add_group("builder");

    let town = Region::polygon(
        rid("town"),
        vec![
            BlockPos2::new(0, 0),
            BlockPos2::new(20, 0),
            BlockPos2::new(20, 20),
            BlockPos2::new(0, 20),
        ],
        0,
        128,
    )
    .unwrap()
    .with_priority(1)
    .with_owners(owners)
    .with_flag(builtin::PVP, State::Deny)
    .with_flag(builtin::PVP_GROUP, RegionGroup::NonOwners)
    .with_flag(builtin::GREETING, "welcome")
    .with_flag(builtin::PRICE, 12.5)
    .with_flag(builtin::HEAL_AMOUNT, 3i64)
    .with_flag(builtin::BUYABLE, true);

    let shop = Region::cuboid(rid("shop"), BlockPos::new(2, 0, 2), BlockPos::new(6, 10, 6))
        .with_priority(5)
        .with_parent(rid("town"));

    vec![
        fixtures::entry_region(),
        fixtures::exit_region(),
        town,
        shop,
        Region::global(rid(fixtures::GLOBAL)),
    ]
}

fn sorted(mut regions: Vec<Region>) -> Vec<Region> {
    regions.sort_by(|a, b| a.id().cmp(b.id()));
    regions
}

#[test]
fn round_trip_preserves_regions() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let file = YamlRegionFile::new("world", dir.path().join("regions.yml"));
    let catalog = FlagCatalog::builtin();

    let regions = sample_regions();
    let shared: Vec<Arc<Region>> = regions.iter().cloned().map(Arc::new).collect();
    file.save_all(&catalog, &shared).unwrap();

    let loaded = file.load_all(&catalog).unwrap();
    assert_eq!(sorted(loaded), sorted(regions));
}

#[test]
fn save_writes_header_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("regions.yml");
    let file = YamlRegionFile::new("world", &path);
    let shared: Vec<Arc<Region>> = sample_regions().into_iter().map(Arc::new).collect();
    file.save_all(&FlagCatalog::builtin(), &shared).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# Bastion region file"), "{text}");
    assert!(text.contains("regions:"));
    let names: Vec<String> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["regions.yml"]);
}

#[test]
fn absent_and_empty_documents_load_empty() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = FlagCatalog::builtin();
    let path = dir.path().join("regions.yml");
    let file = YamlRegionFile::new("world", &path);
    assert!(file.load_all(&catalog).unwrap().is_empty());

    for text in ["", "# nothing here\n", "other: 1\n", "regions:\n"] {
        fs::write(&path, text).unwrap();
        assert!(file.load_all(&catalog).unwrap().is_empty(), "{text:?}");
    }
}

#[test]
fn undecodable_documents_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = FlagCatalog::builtin();
    let path = dir.path().join("regions.yml");
    let file = YamlRegionFile::new("world", &path);

    for text in ["regions: [a, b\n", "- just\n- a list\n", "regions: 7\n"] {
        fs::write(&path, text).unwrap();
        assert!(
            matches!(file.load_all(&catalog), Err(StoreError::Parse { .. })),
            "{text:?}"
        );
    }
}

#[test]
fn malformed_entries_are_skipped() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regions.yml");
    fs::write(
        &path,
        "regions:\n\
         \x20 good:\n\
         \x20   type: cuboid\n\
         \x20   min: {x: 0, y: 0, z: 0}\n\
         \x20   max: {x: 4, y: 4, z: 4}\n\
         \x20   priority: 0\n\
         \x20 no-priority:\n\
         \x20   type: global\n\
         \x20 bad-type:\n\
         \x20   type: sphere\n\
         \x20   priority: 0\n\
         \x20 'bad id!':\n\
         \x20   type: global\n\
         \x20   priority: 0\n\
         \x20 not-a-map: 12\n",
    )
    .unwrap();
    let loaded = YamlRegionFile::new("world", &path)
        .load_all(&FlagCatalog::builtin())
        .unwrap();
    let ids: Vec<&str> = loaded.iter().map(|r| r.id().as_str()).collect();
    assert_eq!(ids, ["good"]);
}

#[test]
fn dangling_parent_is_cleared_on_reload() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regions.yml");
    fs::write(
        &path,
        "regions:\n\
         \x20 child:\n\
         \x20   type: global\n\
         \x20   priority: 0\n\
         \x20   parent: gone\n",
    )
    .unwrap();

    let manager = RegionManager::with_catalog(fixtures::catalog());
    let report = load_into(&YamlRegionFile::new("world", &path), &manager).unwrap();
    assert_eq!(report.loaded, 1);
    let child = manager.get_region("child").unwrap();
    assert_eq!(child.parent(), None);
}

#[test]
fn cyclic_parents_are_broken_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regions.yml");
    fs::write(
        &path,
        "regions:\n\
         \x20 a: {type: global, priority: 0, parent: b}\n\
         \x20 b: {type: global, priority: 0, parent: a}\n",
    )
    .unwrap();
    let manager = RegionManager::with_catalog(fixtures::catalog());
    let report = load_into(&YamlRegionFile::new("world", &path), &manager).unwrap();
    assert_eq!(report.broken_cycles.len(), 1);
    let linked = ["a", "b"]
        .iter()
        .filter(|id| manager.get_region(id).unwrap().parent().is_some())
        .count();
    assert_eq!(linked, 1);
}

#[test]
fn failed_load_keeps_previous_regions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regions.yml");
    let manager = fixtures::scenario_manager();
    let before = manager.generation();

    fs::write(&path, "regions: [unterminated\n").unwrap();
    assert!(load_into(&YamlRegionFile::new("world", &path), &manager).is_err());
    assert_eq!(manager.generation(), before);
    assert!(manager.has_region("e"));
}

#[test]
fn manager_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = YamlRegionFile::new("world", dir.path().join("regions.yml"));
    let source = fixtures::scenario_manager();
    assert_eq!(save_from(&file, &source).unwrap(), 3);

    let target = RegionManager::with_catalog(fixtures::catalog());
    load_into(&file, &target).unwrap();
    let at = BlockPos::new(5, 64, 5);
    assert!(target.test_state(at, builtin::ENTRY, Some(&fixtures::vip())));
    assert!(!target.test_state(at, builtin::ENTRY, Some(&fixtures::builder())));
}

#[test]
fn difference_saves_are_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let file = YamlRegionFile::new("world", dir.path().join("regions.yml"));
    let err = file
        .save_changes(&FlagCatalog::builtin(), &RegionDifference::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::DifferenceSaveUnsupported { ref store } if store == "world"));
}

#[test]
fn failed_rename_removes_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("regions.yml");
    // A non-empty directory at the target makes the final rename fail.
    fs::create_dir(&path).unwrap();
    fs::write(path.join("keep"), "x").unwrap();
    let file = YamlRegionFile::new("world", &path);
    let shared: Vec<Arc<Region>> = sample_regions().into_iter().map(Arc::new).collect();

    let err = file.save_all(&FlagCatalog::builtin(), &shared).unwrap_err();
    assert!(matches!(err, StoreError::Rename { .. }), "{err}");
    assert!(!dir.path().join("regions.yml.tmp").exists());
    assert!(path.join("keep").exists());
}
