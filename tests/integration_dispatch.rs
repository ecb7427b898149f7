mod common;

use hybrid_dispatch::dispatch::action_space::ActionSpace;
use hybrid_dispatch::dispatch::policy::{NoPolicy, PolicyTable};
use hybrid_dispatch::dispatch::types::{Action, CandidateSource, FEASIBILITY_TOLERANCE, State};
use hybrid_dispatch::error::DispatchError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

use common::{default_space, engine_with, sample_states, single_entry_policy};

#[test]
fn policy_hit_is_corrected_to_cheapest_grid_level() {
    let state = State::new(0.6, 0.4, 100.0, 0.15).unwrap();
    let engine = engine_with(default_space(), single_entry_policy(&state, 50, 20));
    let mut rng = StdRng::seed_from_u64(0);

    let r = engine.dispatch(&state, &mut rng).unwrap();

    assert_eq!(r.candidate_source, CandidateSource::Policy);
    assert_eq!((r.pv_count, r.wt_count), (50, 20));
    assert!((r.renewable_energy - 38.0).abs() < 1e-9);
    assert_eq!(r.grid_power, 100.0);
    assert!((r.total_energy - 138.0).abs() < 1e-9);
    assert!(r.demand_met);
}

#[test]
fn zero_demand_uses_no_grid_and_no_grid_charges() {
    let state = State::new(0.6, 0.4, 0.0, 0.15).unwrap();
    let engine = engine_with(default_space(), single_entry_policy(&state, 50, 20));
    let mut rng = StdRng::seed_from_u64(0);

    let r = engine.dispatch(&state, &mut rng).unwrap();
    assert_eq!(r.grid_power, 0.0);

    let grid_free = engine.economics().breakdown(&r.action(), &state);
    assert_eq!(grid_free.grid, 0.0);
    let co2 = engine.emissions().breakdown(&r.action(), &state);
    assert_eq!(co2.grid, 0.0);
}

#[test]
fn fallback_is_reproducible_with_same_seed() {
    let engine = engine_with(default_space(), NoPolicy);
    let states = sample_states();

    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        states
            .iter()
            .map(|s| engine.dispatch(s, &mut rng).unwrap())
            .collect::<Vec<_>>()
    };

    let a = run(9);
    let b = run(9);
    assert_eq!(a, b);
    assert!(a.iter().all(|r| r.candidate_source == CandidateSource::Fallback));
}

#[test]
fn every_result_is_feasible_or_best_effort() {
    let engine = engine_with(default_space(), NoPolicy);
    let mut rng = StdRng::seed_from_u64(3);

    for state in sample_states() {
        let r = engine.dispatch(&state, &mut rng).unwrap();
        let space = engine.corrector().space();
        assert!(space.pv_levels().contains(&r.pv_count));
        assert!(space.wt_levels().contains(&r.wt_count));
        assert!(space.grid_levels().contains(&r.grid_power));

        let capacity = engine.corrector().max_capacity(&state);
        if capacity + FEASIBILITY_TOLERANCE >= state.demand {
            assert!(r.demand_met, "feasible state left unmet: {state:?}");
        } else {
            assert!(!r.demand_met);
            assert_eq!(r.grid_power, space.max_grid());
            assert!((r.total_energy - capacity).abs() < 1e-6);
        }
    }
}

#[test]
fn grid_is_minimal_for_the_chosen_pair() {
    let engine = engine_with(default_space(), NoPolicy);
    let mut rng = StdRng::seed_from_u64(11);

    for state in sample_states() {
        let r = engine.dispatch(&state, &mut rng).unwrap();
        if !r.demand_met {
            continue;
        }
        let space = engine.corrector().space();
        let lower = space
            .grid_levels()
            .iter()
            .copied()
            .filter(|g| *g < r.grid_power)
            .any(|g| g >= state.demand - r.renewable_energy);
        assert!(!lower, "a smaller grid level would also cover {state:?}");
    }
}

#[test]
fn correction_is_idempotent() {
    let engine = engine_with(default_space(), NoPolicy);
    let corrector = engine.corrector();
    for state in sample_states() {
        for (pv, wt) in [(0, 0), (50, 20), (300, 50), (17, 3)] {
            let once = corrector.correct(pv, wt, &state);
            let twice = corrector.correct(once.pv_count, once.wt_count, &state);
            assert_eq!(once, twice, "not a fixed point for {state:?}");
        }
    }
}

#[test]
fn cost_and_co2_grow_with_grid_import() {
    let engine = engine_with(default_space(), NoPolicy);
    let state = State::new(0.5, 0.5, 100.0, 0.2).unwrap();
    let low = Action::new(50, 20, 50.0);
    let high = Action::new(50, 20, 150.0);

    assert!(engine.economics().cost(&high, &state) > engine.economics().cost(&low, &state));
    assert!(engine.emissions().co2(&high, &state) > engine.emissions().co2(&low, &state));
}

#[test]
fn empty_allocation_costs_nothing() {
    let engine = engine_with(default_space(), NoPolicy);
    let state = State::new(0.5, 0.5, 0.0, 0.2).unwrap();
    let idle = Action::new(0, 0, 0.0);
    assert_eq!(engine.economics().cost(&idle, &state), 0.0);
    assert_eq!(engine.emissions().co2(&idle, &state), 0.0);
}

#[test]
fn demand_above_capacity_reports_shortfall() {
    let space = ActionSpace::new(vec![0, 10], vec![0, 5], vec![0.0, 50.0]).unwrap();
    let engine = engine_with(space, NoPolicy);
    let state = State::new(1.0, 1.0, 500.0, 0.1).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let r = engine.dispatch(&state, &mut rng).unwrap();
    assert!(!r.demand_met);
    assert_eq!(r.action(), Action::new(10, 5, 50.0));
    assert!((r.excess + 435.0).abs() < 1e-9);
}

#[test]
fn invalid_state_is_rejected_before_lookup() {
    let engine = engine_with(default_space(), NoPolicy);
    let bad = State {
        solar_cf: 0.5,
        wind_cf: f64::NAN,
        demand: 100.0,
        grid_price: 0.1,
    };
    let mut rng = StdRng::seed_from_u64(0);
    let err = engine.dispatch(&bad, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::InvalidState {
            field: "wind_cf",
            ..
        }
    ));
}

#[test]
fn concurrent_dispatch_matches_sequential() {
    let state = State::new(0.6, 0.4, 100.0, 0.15).unwrap();
    let table: Arc<PolicyTable> = Arc::new(single_entry_policy(&state, 50, 20));
    let engine = engine_with(default_space(), Arc::clone(&table));
    let states = sample_states();

    let expected: Vec<_> = states
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut rng = StdRng::seed_from_u64(i as u64);
            engine.dispatch(s, &mut rng).unwrap()
        })
        .collect();

    let actual: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = states
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let engine = &engine;
                scope.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(i as u64);
                    engine.dispatch(s, &mut rng).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(expected, actual);
}

#[test]
fn swapping_policy_changes_candidate_source() {
    let state = State::new(0.6, 0.4, 100.0, 0.15).unwrap();
    let engine = engine_with(default_space(), NoPolicy);
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        engine.dispatch(&state, &mut rng).unwrap().candidate_source,
        CandidateSource::Fallback
    );

    let reloaded = engine.with_policy(single_entry_policy(&state, 50, 20));
    assert_eq!(
        reloaded.dispatch(&state, &mut rng).unwrap().candidate_source,
        CandidateSource::Policy
    );
}
