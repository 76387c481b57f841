//! Test utilities for Bastion development.
//!
//! Provides [`TestActor`], an in-memory [`Actor`] with a fixed name and
//! group list, the scenario [`fixtures`], and [`init_tracing`] for tests
//! that want to see log output.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::BTreeSet;

use bastion_core::{AccountId, Actor};
use tracing_subscriber::EnvFilter;

/// Actor backed by plain data.
///
/// Group names are stored lower-cased, matching how the engine asks.
#[derive(Clone, Debug)]
pub struct TestActor {
    id: AccountId,
    name: String,
    groups: BTreeSet<String>,
}

impl TestActor {
    /// Actor with a random account id and no groups.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AccountId::random(),
            name: name.into(),
            groups: BTreeSet::new(),
        }
    }

    pub fn with_id(mut self, id: AccountId) -> Self {
        self.id = id;
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.groups.insert(group.to_lowercase());
        self
    }

    pub fn with_groups<'a>(mut self, groups: impl IntoIterator<Item = &'a str>) -> Self {
        self.groups
            .extend(groups.into_iter().map(str::to_lowercase));
        self
    }
}

impl Actor for TestActor {
    fn unique_id(&self) -> AccountId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

/// Install a `tracing` subscriber writing through the test harness.
///
/// Honors `RUST_LOG` and defaults to `warn`. Safe to call from every
/// test; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
