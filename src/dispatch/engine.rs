//! Dispatch engine: quantize, consult the policy, correct, and score.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use super::action_space::ActionSpace;
use super::corrector::FeasibilityCorrector;
use super::economics::{EconomicModel, EconomicParams};
use super::emissions::{EmissionModel, EmissionParams};
use super::policy::{PolicyLookup, Quantizer, Suggestion};
use super::types::{Action, CandidateSource, DispatchResult, FEASIBILITY_TOLERANCE, State, UnitRatings};
use crate::error::Result;

/// Stateless dispatch engine.
///
/// Generic over `P: PolicyLookup` for static dispatch. The policy is held
/// read-only; swapping it means building a new engine with
/// [`DispatchEngine::with_policy`]. Randomness for the policy-miss fallback is
/// passed into each [`DispatchEngine::dispatch`] call, so the engine itself is
/// `Send + Sync` whenever `P` is.
#[derive(Debug, Clone)]
pub struct DispatchEngine<P: PolicyLookup> {
    corrector: FeasibilityCorrector,
    economics: EconomicModel,
    emissions: EmissionModel,
    quantizer: Quantizer,
    policy: P,
}

impl<P: PolicyLookup> DispatchEngine<P> {
    /// Creates a new dispatch engine.
    ///
    /// # Arguments
    ///
    /// * `space` - Level sets shared with the policy table
    /// * `ratings` - Unit ratings used by the corrector and both models
    /// * `economics` - Cost parameters
    /// * `emissions` - Emission parameters
    /// * `quantizer` - Bucket widths used to key the policy
    /// * `policy` - Read-only policy lookup
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DispatchError::InvalidParameter`] if any model
    /// parameter or quantizer width is invalid.
    pub fn new(
        space: ActionSpace,
        ratings: UnitRatings,
        economics: EconomicParams,
        emissions: EmissionParams,
        quantizer: Quantizer,
        policy: P,
    ) -> Result<Self> {
        let ratings = UnitRatings::new(
            ratings.pv_unit_kw,
            ratings.wt_unit_kw,
            ratings.interval_hours,
        )?;
        quantizer.validate()?;
        Ok(Self {
            corrector: FeasibilityCorrector::new(space, ratings),
            economics: EconomicModel::new(economics, ratings)?,
            emissions: EmissionModel::new(emissions, ratings)?,
            quantizer,
            policy,
        })
    }

    /// Replaces the policy, keeping every other component.
    pub fn with_policy<Q: PolicyLookup>(self, policy: Q) -> DispatchEngine<Q> {
        DispatchEngine {
            corrector: self.corrector,
            economics: self.economics,
            emissions: self.emissions,
            quantizer: self.quantizer,
            policy,
        }
    }

    /// Dispatches one interval.
    ///
    /// `rng` is only drawn from when the policy misses.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DispatchError::InvalidState`] if `state` is
    /// malformed. Infeasible demand is not an error; it is reported through
    /// [`DispatchResult::demand_met`].
    pub fn dispatch<R: Rng + ?Sized>(&self, state: &State, rng: &mut R) -> Result<DispatchResult> {
        state.validate()?;

        let key = self.quantizer.quantize(state);
        let (suggestion, source) = match self.policy.lookup(&key) {
            Some(s) => (s, CandidateSource::Policy),
            None => {
                let s = self.sample_fallback(rng);
                debug!(
                    ?key,
                    pv = s.pv_count,
                    wt = s.wt_count,
                    "policy miss, sampled fallback"
                );
                (s, CandidateSource::Fallback)
            }
        };

        let action = self
            .corrector
            .correct(suggestion.pv_count, suggestion.wt_count, state);
        Ok(self.score(action, state, source))
    }

    /// Scores an allocation and assembles the result record.
    pub fn score(&self, action: Action, state: &State, source: CandidateSource) -> DispatchResult {
        let ratings = self.corrector.ratings();
        let pv_energy = ratings.pv_energy(action.pv_count, state.solar_cf);
        let wt_energy = ratings.wt_energy(action.wt_count, state.wind_cf);
        let renewable_energy = pv_energy + wt_energy;
        let total_energy = renewable_energy + action.grid_power;
        let demand_met = total_energy + FEASIBILITY_TOLERANCE >= state.demand;

        if !demand_met {
            warn!(
                demand = state.demand,
                total_energy, "demand exceeds available capacity, shortfall reported"
            );
        }

        DispatchResult {
            state: *state,
            pv_count: action.pv_count,
            wt_count: action.wt_count,
            grid_power: action.grid_power,
            pv_energy,
            wt_energy,
            renewable_energy,
            total_energy,
            excess: total_energy - state.demand,
            cost: self.economics.cost(&action, state),
            co2: self.emissions.co2(&action, state),
            demand_met,
            candidate_source: source,
        }
    }

    fn sample_fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> Suggestion {
        let space = self.corrector.space();
        Suggestion {
            pv_count: space.pv_levels().choose(rng).copied().unwrap_or(0),
            wt_count: space.wt_levels().choose(rng).copied().unwrap_or(0),
        }
    }

    pub fn corrector(&self) -> &FeasibilityCorrector {
        &self.corrector
    }

    pub fn economics(&self) -> &EconomicModel {
        &self.economics
    }

    pub fn emissions(&self) -> &EmissionModel {
        &self.emissions
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}
