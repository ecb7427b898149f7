//! Feasibility correction: turn a renewable candidate into an allocation that
//! meets demand with the least grid import.
//!
//! The policy only ever proposes panel and turbine counts. Grid import is
//! derived here for every interval:
//!
//! 1. `renewable = pv_energy + wt_energy` for the candidate.
//! 2. `required = max(0, demand - renewable - FEASIBILITY_TOLERANCE)`, so a
//!    pair that already meets demand up to rounding needs no grid.
//! 3. The first grid level `>= required`, scanning ascending.
//! 4. If no level is large enough, search every `(pv, wt)` pair, both sets in
//!    descending order, recomputing step 3 per pair and keeping the smallest
//!    excess over demand. The first pair reaching the minimum wins.
//!
//! When no pair can meet demand the search returns the pair with the largest
//! total generation at maximum grid import, again first-wins. Keeping the
//! snapped candidate at maximum grid would also be best effort; the search
//! result is preferred because it leaves the smallest shortfall.

use tracing::debug;

use super::action_space::ActionSpace;
use super::types::{Action, FEASIBILITY_TOLERANCE, State, UnitRatings};

/// Repairs candidate allocations against the shared action space.
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibilityCorrector {
    space: ActionSpace,
    ratings: UnitRatings,
}

impl FeasibilityCorrector {
    pub fn new(space: ActionSpace, ratings: UnitRatings) -> Self {
        Self { space, ratings }
    }

    pub fn space(&self) -> &ActionSpace {
        &self.space
    }

    pub fn ratings(&self) -> &UnitRatings {
        &self.ratings
    }

    /// Largest energy the three sources can deliver under `state`.
    pub fn max_capacity(&self, state: &State) -> f64 {
        self.ratings
            .renewable_energy(self.space.max_pv(), self.space.max_wt(), state)
            + self.space.max_grid()
    }

    /// Whether `action` covers the demand in `state`.
    pub fn is_feasible(&self, action: &Action, state: &State) -> bool {
        let total = self
            .ratings
            .renewable_energy(action.pv_count, action.wt_count, state)
            + action.grid_power;
        total + FEASIBILITY_TOLERANCE >= state.demand
    }

    /// Corrects a candidate `(pv, wt)` pair for `state`.
    ///
    /// Candidates off the level grid are first snapped up to the nearest
    /// level. Calling `correct` again on the returned counts yields the same
    /// action.
    pub fn correct(&self, candidate_pv: u32, candidate_wt: u32, state: &State) -> Action {
        let pv = self.space.snap_pv(candidate_pv);
        let wt = self.space.snap_wt(candidate_wt);
        if pv != candidate_pv || wt != candidate_wt {
            debug!(candidate_pv, candidate_wt, pv, wt, "snapped candidate onto level grid");
        }

        let renewable = self.ratings.renewable_energy(pv, wt, state);
        if let Some(grid) = self.space.min_grid_at_least(required_grid(renewable, state)) {
            return Action::new(pv, wt, grid);
        }

        debug!(
            pv,
            wt,
            demand = state.demand,
            renewable,
            "candidate short even at max grid, searching renewable mix"
        );
        self.search(state)
    }

    fn search(&self, state: &State) -> Action {
        let max_grid = self.space.max_grid();
        // (action, excess) of the best feasible pair
        let mut best: Option<(Action, f64)> = None;
        // (action, total) of the best infeasible pair
        let mut shortfall: Option<(Action, f64)> = None;

        for &pv in self.space.pv_levels().iter().rev() {
            for &wt in self.space.wt_levels().iter().rev() {
                let renewable = self.ratings.renewable_energy(pv, wt, state);
                match self.space.min_grid_at_least(required_grid(renewable, state)) {
                    Some(grid) => {
                        let excess = renewable + grid - state.demand;
                        if best.is_none_or(|(_, e)| excess < e) {
                            best = Some((Action::new(pv, wt, grid), excess));
                        }
                    }
                    None => {
                        let total = renewable + max_grid;
                        if shortfall.is_none_or(|(_, t)| total > t) {
                            shortfall = Some((Action::new(pv, wt, max_grid), total));
                        }
                    }
                }
            }
        }

        best.or(shortfall)
            .map(|(action, _)| action)
            .unwrap_or_else(|| Action::new(0, 0, max_grid))
    }
}

/// Grid import still needed once `renewable` is online, net of the
/// feasibility tolerance.
fn required_grid(renewable: f64, state: &State) -> f64 {
    (state.demand - renewable - FEASIBILITY_TOLERANCE).max(0.0)
}
