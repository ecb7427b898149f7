//! Core dispatch types: environment state, allocations, ratings, and results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result, ensure_positive};

/// Slack used when comparing generation against demand.
///
/// Grid levels are chosen as `g >= demand - renewable`, so `renewable + g` can
/// land one rounding step below `demand` even though the allocation is exact.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// Instantaneous environment state for one dispatch interval.
///
/// Capacity factors are fractions in `[0, 1]` of a unit's rated output.
/// `demand` is energy for the interval (kWh) and `grid_price` is currency per
/// kWh.
///
/// # Examples
///
/// ```
/// use hybrid_dispatch::dispatch::types::State;
///
/// let s = State::new(0.6, 0.4, 100.0, 0.15).unwrap();
/// assert_eq!(s.demand, 100.0);
/// assert!(State::new(0.6, 0.4, -1.0, 0.15).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Solar capacity factor (0.0 to 1.0).
    pub solar_cf: f64,
    /// Wind capacity factor (0.0 to 1.0).
    pub wind_cf: f64,
    /// Energy demand for the interval (kWh, >= 0).
    pub demand: f64,
    /// Grid import price (currency per kWh, >= 0).
    pub grid_price: f64,
}

impl State {
    /// Builds a validated state.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidState`] if any field is non-finite,
    /// negative, or a capacity factor exceeds 1.
    pub fn new(solar_cf: f64, wind_cf: f64, demand: f64, grid_price: f64) -> Result<Self> {
        let state = Self {
            solar_cf,
            wind_cf,
            demand,
            grid_price,
        };
        state.validate()?;
        Ok(state)
    }

    /// Checks every field; nothing is clamped.
    ///
    /// # Errors
    ///
    /// Returns the first offending field as [`DispatchError::InvalidState`].
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("solar_cf", self.solar_cf),
            ("wind_cf", self.wind_cf),
            ("demand", self.demand),
            ("grid_price", self.grid_price),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(DispatchError::InvalidState {
                    field,
                    value,
                    reason: "must be finite",
                });
            }
            if value < 0.0 {
                return Err(DispatchError::InvalidState {
                    field,
                    value,
                    reason: "must be >= 0",
                });
            }
        }
        for (field, value) in [("solar_cf", self.solar_cf), ("wind_cf", self.wind_cf)] {
            if value > 1.0 {
                return Err(DispatchError::InvalidState {
                    field,
                    value,
                    reason: "capacity factor must be <= 1",
                });
            }
        }
        Ok(())
    }
}

impl TryFrom<&[f64]> for State {
    type Error = DispatchError;

    /// Reads `[solar_cf, wind_cf, demand, grid_price]`.
    fn try_from(values: &[f64]) -> Result<Self> {
        match *values {
            [solar_cf, wind_cf, demand, grid_price] => {
                Self::new(solar_cf, wind_cf, demand, grid_price)
            }
            _ => Err(DispatchError::InvalidState {
                field: "state",
                value: values.len() as f64,
                reason: "expected exactly 4 values",
            }),
        }
    }
}

/// A complete allocation across the three sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Number of PV panels online.
    pub pv_count: u32,
    /// Number of wind turbines online.
    pub wt_count: u32,
    /// Grid import for the interval (kWh, >= 0).
    pub grid_power: f64,
}

impl Action {
    pub fn new(pv_count: u32, wt_count: u32, grid_power: f64) -> Self {
        Self {
            pv_count,
            wt_count,
            grid_power,
        }
    }
}

/// Rated output per generation unit and the interval length.
///
/// Shared by the corrector and both scoring models so that a unit count turns
/// into the same energy everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitRatings {
    /// Rated power of one PV panel (kW).
    pub pv_unit_kw: f64,
    /// Rated power of one wind turbine (kW).
    pub wt_unit_kw: f64,
    /// Interval duration (hours).
    pub interval_hours: f64,
}

impl Default for UnitRatings {
    fn default() -> Self {
        Self {
            pv_unit_kw: 1.0,
            wt_unit_kw: 1.0,
            interval_hours: 1.0,
        }
    }
}

impl UnitRatings {
    /// Builds validated ratings.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidParameter`] unless every field is finite
    /// and strictly positive.
    pub fn new(pv_unit_kw: f64, wt_unit_kw: f64, interval_hours: f64) -> Result<Self> {
        ensure_positive("ratings.pv_unit_kw", pv_unit_kw)?;
        ensure_positive("ratings.wt_unit_kw", wt_unit_kw)?;
        ensure_positive("ratings.interval_hours", interval_hours)?;
        Ok(Self {
            pv_unit_kw,
            wt_unit_kw,
            interval_hours,
        })
    }

    /// PV energy for the interval (kWh).
    pub fn pv_energy(&self, pv_count: u32, solar_cf: f64) -> f64 {
        f64::from(pv_count) * self.pv_unit_kw * solar_cf * self.interval_hours
    }

    /// Wind energy for the interval (kWh).
    pub fn wt_energy(&self, wt_count: u32, wind_cf: f64) -> f64 {
        f64::from(wt_count) * self.wt_unit_kw * wind_cf * self.interval_hours
    }

    /// Combined renewable energy for a panel/turbine pair.
    pub fn renewable_energy(&self, pv_count: u32, wt_count: u32, state: &State) -> f64 {
        self.pv_energy(pv_count, state.solar_cf) + self.wt_energy(wt_count, state.wind_cf)
    }
}

/// Where the renewable candidate for an interval came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Suggested by the policy table.
    Policy,
    /// Drawn from the level sets after a policy miss.
    Fallback,
    /// Fixed allocation of the naive baseline.
    Fixed,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Policy => "policy",
            Self::Fallback => "fallback",
            Self::Fixed => "fixed",
        };
        f.write_str(s)
    }
}

/// Scored allocation for one interval. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    /// State the allocation was computed for.
    pub state: State,
    /// Number of PV panels online.
    pub pv_count: u32,
    /// Number of wind turbines online.
    pub wt_count: u32,
    /// Grid import (kWh).
    pub grid_power: f64,
    /// PV energy (kWh).
    pub pv_energy: f64,
    /// Wind energy (kWh).
    pub wt_energy: f64,
    /// PV plus wind energy (kWh).
    pub renewable_energy: f64,
    /// Renewable energy plus grid import (kWh).
    pub total_energy: f64,
    /// `total_energy - demand`; negative on shortfall.
    pub excess: f64,
    /// Monetary cost of the allocation.
    pub cost: f64,
    /// CO2 mass of the allocation (kg).
    pub co2: f64,
    /// Whether total generation covers demand.
    pub demand_met: bool,
    /// Origin of the renewable candidate.
    pub candidate_source: CandidateSource,
}

impl DispatchResult {
    /// The allocation part of the result.
    pub fn action(&self) -> Action {
        Action::new(self.pv_count, self.wt_count, self.grid_power)
    }
}

impl fmt::Display for DispatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "solar={:.2} wind={:.2} demand={:>7.2} | pv={:>4} wt={:>3} grid={:>7.2} | \
             renewable={:>7.2} total={:>7.2} | cost={:>8.3} co2={:>8.3} | {} ok={}",
            self.state.solar_cf,
            self.state.wind_cf,
            self.state.demand,
            self.pv_count,
            self.wt_count,
            self.grid_power,
            self.renewable_energy,
            self.total_energy,
            self.cost,
            self.co2,
            self.candidate_source,
            self.demand_met,
        )
    }
}
