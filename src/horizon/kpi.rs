//! Post-hoc aggregates over a dispatched horizon.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dispatch::types::{CandidateSource, DispatchResult};

/// Relative weights of cost and CO2 in the combined objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub cost_weight: f64,
    pub co2_weight: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            cost_weight: 1.0,
            co2_weight: 1.0,
        }
    }
}

/// Aggregate view of a complete run.
///
/// Computed post-hoc from `&[DispatchResult]` so the reported numbers always
/// agree with the step records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HorizonSummary {
    /// Number of dispatched intervals.
    pub steps: usize,
    /// Sum of per-interval cost.
    pub total_cost: f64,
    /// Sum of per-interval CO2 (kg).
    pub total_co2: f64,
    /// Sum of demand (kWh).
    pub total_demand: f64,
    /// Sum of grid import (kWh).
    pub total_grid_energy: f64,
    /// Sum of PV plus wind energy (kWh).
    pub total_renewable_energy: f64,
    /// Sum of delivered energy (kWh).
    pub total_energy: f64,
    pub average_cost: f64,
    pub average_co2: f64,
    pub average_grid_power: f64,
    pub average_total_energy: f64,
    pub average_pv_count: f64,
    pub average_wt_count: f64,
    /// Renewable energy as a fraction of delivered energy (0.0 to 1.0).
    pub renewable_share: f64,
    /// Intervals where demand was not met.
    pub shortfall_count: usize,
    /// Intervals whose candidate came from the fallback sampler.
    pub fallback_count: usize,
    /// `cost_weight * total_cost + co2_weight * total_co2`.
    pub weighted_objective: f64,
}

impl HorizonSummary {
    /// Computes every aggregate from the step records.
    ///
    /// # Arguments
    ///
    /// * `results` - Dispatch results in step order
    /// * `weights` - Weights for the combined objective
    pub fn from_results(results: &[DispatchResult], weights: ObjectiveWeights) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut s = Self {
            steps: results.len(),
            ..Self::default()
        };
        let mut pv_sum = 0.0_f64;
        let mut wt_sum = 0.0_f64;

        for r in results {
            s.total_cost += r.cost;
            s.total_co2 += r.co2;
            s.total_demand += r.state.demand;
            s.total_grid_energy += r.grid_power;
            s.total_renewable_energy += r.renewable_energy;
            s.total_energy += r.total_energy;
            pv_sum += f64::from(r.pv_count);
            wt_sum += f64::from(r.wt_count);
            if !r.demand_met {
                s.shortfall_count += 1;
            }
            if r.candidate_source == CandidateSource::Fallback {
                s.fallback_count += 1;
            }
        }

        let n = results.len() as f64;
        s.average_cost = s.total_cost / n;
        s.average_co2 = s.total_co2 / n;
        s.average_grid_power = s.total_grid_energy / n;
        s.average_total_energy = s.total_energy / n;
        s.average_pv_count = pv_sum / n;
        s.average_wt_count = wt_sum / n;
        s.renewable_share = if s.total_energy > 0.0 {
            s.total_renewable_energy / s.total_energy
        } else {
            0.0
        };
        s.weighted_objective = weights.cost_weight * s.total_cost + weights.co2_weight * s.total_co2;
        s
    }
}

impl fmt::Display for HorizonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Horizon Summary ({} steps) ---", self.steps)?;
        writeln!(
            f,
            "Total cost:            {:.2} (avg {:.3})",
            self.total_cost, self.average_cost
        )?;
        writeln!(
            f,
            "Total CO2:             {:.2} kg (avg {:.3})",
            self.total_co2, self.average_co2
        )?;
        writeln!(
            f,
            "Grid energy:           {:.2} kWh (avg {:.2})",
            self.total_grid_energy, self.average_grid_power
        )?;
        writeln!(
            f,
            "Renewable share:       {:.1}%",
            self.renewable_share * 100.0
        )?;
        writeln!(
            f,
            "Avg PV / WT units:     {:.1} / {:.1}",
            self.average_pv_count, self.average_wt_count
        )?;
        writeln!(f, "Fallback candidates:   {}", self.fallback_count)?;
        writeln!(f, "Shortfall intervals:   {}", self.shortfall_count)?;
        write!(f, "Weighted objective:    {:.2}", self.weighted_objective)
    }
}
