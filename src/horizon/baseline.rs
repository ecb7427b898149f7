//! Fixed-allocation baseline used as a comparison point for the engine.

use serde::{Deserialize, Serialize};

use crate::dispatch::engine::DispatchEngine;
use crate::dispatch::policy::PolicyLookup;
use crate::dispatch::types::{Action, CandidateSource, DispatchResult, State};

/// Naive strategy: the same allocation every interval.
///
/// If the fixed allocation generates more than `max_energy`, grid import is
/// trimmed by the excess (never below zero) and the interval counts as a
/// violation of the energy cap. Demand is not consulted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NaiveBaseline {
    pub pv_count: u32,
    pub wt_count: u32,
    pub grid_power: f64,
    /// Cap on total generation per interval (kWh).
    pub max_energy: f64,
}

impl Default for NaiveBaseline {
    fn default() -> Self {
        Self {
            pv_count: 50,
            wt_count: 20,
            grid_power: 500.0,
            max_energy: 1000.0,
        }
    }
}

/// Baseline results plus the number of capped intervals.
#[derive(Debug, Clone)]
pub struct BaselineRun {
    pub results: Vec<DispatchResult>,
    pub cap_violations: usize,
}

impl NaiveBaseline {
    /// Allocation for one interval and whether the energy cap was hit.
    pub fn action_for<P: PolicyLookup>(
        &self,
        engine: &DispatchEngine<P>,
        state: &State,
    ) -> (Action, bool) {
        let renewable =
            engine
                .corrector()
                .ratings()
                .renewable_energy(self.pv_count, self.wt_count, state);
        let total = renewable + self.grid_power;
        if total > self.max_energy {
            let grid = (self.grid_power - (total - self.max_energy)).max(0.0);
            (Action::new(self.pv_count, self.wt_count, grid), true)
        } else {
            (Action::new(self.pv_count, self.wt_count, self.grid_power), false)
        }
    }

    /// Scores the baseline over `states` with the engine's models.
    pub fn run<P: PolicyLookup>(&self, engine: &DispatchEngine<P>, states: &[State]) -> BaselineRun {
        let mut results = Vec::with_capacity(states.len());
        let mut cap_violations = 0;
        for state in states {
            let (action, capped) = self.action_for(engine, state);
            if capped {
                cap_violations += 1;
            }
            results.push(engine.score(action, state, CandidateSource::Fixed));
        }
        BaselineRun {
            results,
            cap_violations,
        }
    }
}
