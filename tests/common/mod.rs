//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use hybrid_dispatch::dispatch::action_space::ActionSpace;
use hybrid_dispatch::dispatch::economics::EconomicParams;
use hybrid_dispatch::dispatch::emissions::EmissionParams;
use hybrid_dispatch::dispatch::engine::DispatchEngine;
use hybrid_dispatch::dispatch::policy::{PolicyLookup, PolicyTable, Quantizer, Suggestion};
use hybrid_dispatch::dispatch::types::{State, UnitRatings};

/// Default level sets: panels 0..=300 step 10, turbines 0..=50 step 5,
/// grid 0..=1000 step 50.
pub fn default_space() -> ActionSpace {
    ActionSpace::uniform(300, 10, 50, 5, 1000.0, 50.0).unwrap()
}

/// Engine with default models over `space` and the given policy.
pub fn engine_with<P: PolicyLookup>(space: ActionSpace, policy: P) -> DispatchEngine<P> {
    DispatchEngine::new(
        space,
        UnitRatings::default(),
        EconomicParams::default(),
        EmissionParams::default(),
        Quantizer::default(),
        policy,
    )
    .unwrap()
}

/// Policy table holding a single entry for `state`'s cell.
pub fn single_entry_policy(state: &State, pv_count: u32, wt_count: u32) -> PolicyTable {
    let key = Quantizer::default().quantize(state);
    [(key, Suggestion { pv_count, wt_count })]
        .into_iter()
        .collect()
}

/// A spread of valid states: night, dawn, noon, calm, windy, zero demand,
/// and a demand above total capacity.
pub fn sample_states() -> Vec<State> {
    [
        (0.0, 0.3, 120.0, 0.12),
        (0.2, 0.5, 80.0, 0.10),
        (0.6, 0.4, 100.0, 0.15),
        (0.95, 0.05, 300.0, 0.30),
        (0.1, 0.9, 150.0, 0.05),
        (0.5, 0.5, 0.0, 0.20),
        (0.3, 0.3, 450.0, 0.25),
        (0.0, 0.0, 5000.0, 0.40),
    ]
    .into_iter()
    .map(|(s, w, d, p)| State::new(s, w, d, p).unwrap())
    .collect()
}
