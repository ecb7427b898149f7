//! Multi-interval driver: builds the state series from the resource profiles
//! and dispatches it hour by hour.

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::config::ScenarioConfig;
use crate::dispatch::action_space::ActionSpace;
use crate::dispatch::engine::DispatchEngine;
use crate::dispatch::policy::PolicyLookup;
use crate::dispatch::types::{DispatchResult, State};
use crate::error::Result;
use crate::horizon::baseline::BaselineRun;
use crate::horizon::kpi::HorizonSummary;
use crate::profiles::{ResourceProfile, WindProfile};

/// Added to the scenario seed for the wind series.
const WIND_SEED_OFFSET: u64 = 1;
/// Added to the scenario seed for the policy-miss fallback draws.
const FALLBACK_SEED_OFFSET: u64 = 101;

/// Everything produced by one scenario run.
#[derive(Debug, Clone)]
pub struct HorizonRun {
    pub states: Vec<State>,
    pub results: Vec<DispatchResult>,
    pub summary: HorizonSummary,
    pub baseline: BaselineRun,
    pub baseline_summary: HorizonSummary,
}

/// Builds a dispatch engine from the scenario's model sections.
///
/// # Errors
///
/// Returns a [`crate::error::DispatchError`] if a level set or model
/// parameter is invalid.
pub fn build_engine<P: PolicyLookup>(cfg: &ScenarioConfig, policy: P) -> Result<DispatchEngine<P>> {
    let a = &cfg.action_space;
    let space = ActionSpace::new(
        a.pv_levels.clone(),
        a.wt_levels.clone(),
        a.grid_levels.clone(),
    )?;
    DispatchEngine::new(
        space,
        cfg.ratings,
        cfg.economics.clone(),
        cfg.emissions.clone(),
        cfg.quantizer,
        policy,
    )
}

/// Generates one state per hour: solar from the day/night profile, wind from
/// the seeded series, constant demand and price.
///
/// # Errors
///
/// Returns [`crate::error::DispatchError::InvalidState`] if demand or price
/// is negative or non-finite.
pub fn build_states(cfg: &ScenarioConfig) -> Result<Vec<State>> {
    let sim = &cfg.simulation;
    let mut solar = cfg.solar.clone();
    let mut wind = WindProfile::new(cfg.wind.clone(), sim.seed.wrapping_add(WIND_SEED_OFFSET));

    (0..sim.hours)
        .map(|hour| {
            let solar_cf = solar.capacity_factor(hour);
            let wind_cf = wind.capacity_factor(hour);
            State::new(solar_cf, wind_cf, sim.demand, sim.grid_price)
        })
        .collect()
}

/// Dispatches every state in order with a shared fallback RNG.
///
/// # Errors
///
/// Stops at the first state the engine rejects.
pub fn run_horizon<P: PolicyLookup>(
    engine: &DispatchEngine<P>,
    states: &[State],
    rng: &mut StdRng,
) -> Result<Vec<DispatchResult>> {
    states
        .iter()
        .enumerate()
        .map(|(hour, state)| {
            let result = engine.dispatch(state, rng)?;
            debug!(hour, %result, "interval dispatched");
            Ok(result)
        })
        .collect()
}

/// Runs the scenario end to end: engine over the horizon, then the naive
/// baseline over the same states.
///
/// # Errors
///
/// Returns a [`crate::error::DispatchError`] if the engine cannot be built
/// or a state is rejected.
pub fn run_scenario<P: PolicyLookup>(cfg: &ScenarioConfig, policy: P) -> Result<HorizonRun> {
    let engine = build_engine(cfg, policy)?;
    let states = build_states(cfg)?;
    let weights = cfg.simulation.weights();

    info!(
        hours = states.len(),
        seed = cfg.simulation.seed,
        demand = cfg.simulation.demand,
        "starting horizon"
    );

    let mut rng = StdRng::seed_from_u64(cfg.simulation.seed.wrapping_add(FALLBACK_SEED_OFFSET));
    let results = run_horizon(&engine, &states, &mut rng)?;
    let summary = HorizonSummary::from_results(&results, weights);

    let baseline = cfg.baseline.run(&engine, &states);
    let baseline_summary = HorizonSummary::from_results(&baseline.results, weights);

    info!(
        total_cost = summary.total_cost,
        total_co2 = summary.total_co2,
        shortfalls = summary.shortfall_count,
        fallbacks = summary.fallback_count,
        baseline_cost = baseline_summary.total_cost,
        baseline_co2 = baseline_summary.total_co2,
        "horizon complete"
    );

    Ok(HorizonRun {
        states,
        results,
        summary,
        baseline,
        baseline_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::policy::NoPolicy;

    #[test]
    fn states_follow_horizon_length() {
        let cfg = ScenarioConfig::baseline();
        let states = build_states(&cfg).unwrap();
        assert_eq!(states.len(), 24);
        assert!(states.iter().all(|s| s.demand == 100.0));
        assert!(states.iter().all(|s| s.grid_price == 0.15));
    }

    #[test]
    fn solar_is_low_at_night_and_high_at_noon() {
        let states = build_states(&ScenarioConfig::baseline()).unwrap();
        assert!(states[12].solar_cf > states[0].solar_cf);
    }

    #[test]
    fn same_seed_same_run() {
        let cfg = ScenarioConfig::baseline();
        let a = run_scenario(&cfg, NoPolicy).unwrap();
        let b = run_scenario(&cfg, NoPolicy).unwrap();
        assert_eq!(a.results, b.results);
        assert_eq!(a.summary.total_cost, b.summary.total_cost);
    }

    #[test]
    fn different_seed_changes_wind() {
        let mut cfg = ScenarioConfig::baseline();
        let a = build_states(&cfg).unwrap();
        cfg.simulation.seed = 7;
        let b = build_states(&cfg).unwrap();
        assert!(a.iter().zip(&b).any(|(x, y)| x.wind_cf != y.wind_cf));
    }

    #[test]
    fn baseline_meets_demand_with_default_grid() {
        let run = run_scenario(&ScenarioConfig::baseline(), NoPolicy).unwrap();
        assert_eq!(run.results.len(), 24);
        assert_eq!(run.baseline.results.len(), 24);
        assert_eq!(run.summary.shortfall_count, 0);
        assert_eq!(run.summary.fallback_count, 24);
    }

    #[test]
    fn negative_demand_is_rejected() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.demand = -1.0;
        assert!(build_states(&cfg).is_err());
    }
}
