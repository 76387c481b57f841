//! Criterion micro-benchmarks for bulk replace and YAML persistence.

use std::hint::black_box;

use bastion_bench::{reference_profile, PLOT_SIZE};
use bastion_core::FlagCatalog;
use bastion_store::{save_from, RegionDatabase, YamlRegionFile};
use bastion_test_utils::fixtures;
use criterion::{criterion_group, criterion_main, Criterion};

/// Benchmark: publish a fresh 1024-region set.
fn bench_set_regions_1k(c: &mut Criterion) {
    let manager = reference_profile();
    let regions = fixtures::grid(32, PLOT_SIZE);

    c.bench_function("set_regions_1k", |b| {
        b.iter(|| black_box(manager.set_regions(regions.iter().cloned())));
    });
}

/// Benchmark: save and reload the reference profile as YAML.
fn bench_yaml_round_trip_1k(c: &mut Criterion) {
    let manager = reference_profile();
    let dir = tempfile::tempdir().expect("temp dir");
    let file = YamlRegionFile::new("bench", dir.path().join("regions.yml"));
    let catalog = FlagCatalog::builtin();

    c.bench_function("yaml_round_trip_1k", |b| {
        b.iter(|| {
            save_from(&file, &manager).expect("save");
            black_box(file.load_all(&catalog).expect("load"));
        });
    });
}

criterion_group!(benches, bench_set_regions_1k, bench_yaml_round_trip_1k);
criterion_main!(benches);
