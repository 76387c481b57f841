//! Property test: resolution of a plain state flag against a brute-force
//! reference over random cuboid layouts.

use bastion_core::{builtin, BlockPos, State};
use bastion_engine::{Region, RegionManager};
use bastion_test_utils::fixtures::{self, rid};
use proptest::prelude::*;

#[derive(Clone, Debug)]
struct Spec {
    a: (i32, i32, i32),
    b: (i32, i32, i32),
    priority: i32,
    state: Option<State>,
}

fn arb_spec() -> impl Strategy<Value = Spec> {
    let coord = || (-40i32..40, 0i32..64, -40i32..40);
    let state = prop_oneof![Just(None), Just(Some(State::Allow)), Just(Some(State::Deny))];
    (coord(), coord(), -3i32..4, state).prop_map(|(a, b, priority, state)| Spec {
        a,
        b,
        priority,
        state,
    })
}

fn contains(spec: &Spec, p: BlockPos) -> bool {
    let within = |v: i32, a: i32, b: i32| a.min(b) <= v && v <= a.max(b);
    within(p.x, spec.a.0, spec.b.0) && within(p.y, spec.a.1, spec.b.1) && within(p.z, spec.a.2, spec.b.2)
}

/// Highest priority among regions that set the flag; deny wins a tie.
fn expected(specs: &[Spec], p: BlockPos) -> Option<State> {
    let set: Vec<(i32, State)> = specs
        .iter()
        .filter(|s| contains(s, p))
        .filter_map(|s| s.state.map(|st| (s.priority, st)))
        .collect();
    let top = set.iter().map(|(prio, _)| *prio).max()?;
    let tier = set.iter().filter(|(prio, _)| *prio == top);
    if tier.clone().any(|(_, st)| *st == State::Deny) {
        Some(State::Deny)
    } else {
        tier.map(|(_, st)| *st).next()
    }
}

proptest! {
    #[test]
    fn query_state_matches_reference(
        specs in prop::collection::vec(arb_spec(), 0..12),
        probes in prop::collection::vec((-45i32..45, 0i32..70, -45i32..45), 1..24),
    ) {
        let manager = RegionManager::with_catalog(fixtures::catalog());
        let regions = specs.iter().enumerate().map(|(i, s)| {
            let region = Region::cuboid(
                rid(&format!("r{i}")),
                BlockPos::new(s.a.0, s.a.1, s.a.2),
                BlockPos::new(s.b.0, s.b.1, s.b.2),
            )
            .with_priority(s.priority);
            match s.state {
                Some(state) => region.with_flag(builtin::PVP, state),
                None => region,
            }
        });
        manager.set_regions(regions);

        let snapshot = manager.snapshot();
        for (x, y, z) in probes {
            let p = BlockPos::new(x, y, z);
            let set = snapshot.applicable(p);
            prop_assert_eq!(set.query_state(None, builtin::PVP), expected(&specs, p), "at {:?}", p);
            prop_assert_eq!(
                set.len(),
                specs.iter().filter(|s| contains(s, p)).count()
            );
        }
    }
}
