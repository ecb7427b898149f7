//! Per-interval CO2 mass of an allocation.

use serde::{Deserialize, Serialize};

use super::types::{Action, State, UnitRatings};
use crate::error::{Result, ensure_non_negative, ensure_positive};

/// Emission factors in kg CO2. Defaults assume one-hour intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmissionParams {
    /// Manufacturing emissions per kW of PV rated power.
    pub pv_lifecycle_kg_per_kw: f64,
    /// PV lifetime in intervals (must be > 0).
    pub pv_lifetime_intervals: f64,
    /// Operational emissions per kWh of PV energy.
    pub pv_operational_kg_per_kwh: f64,
    /// Maintenance emissions per panel per interval.
    pub pv_maintenance_kg_per_unit: f64,
    /// Manufacturing emissions per kW of wind rated power.
    pub wt_lifecycle_kg_per_kw: f64,
    /// Wind lifetime in intervals (must be > 0).
    pub wt_lifetime_intervals: f64,
    /// Operational emissions per kWh of wind energy.
    pub wt_operational_kg_per_kwh: f64,
    /// Maintenance emissions per turbine per interval.
    pub wt_maintenance_kg_per_unit: f64,
    /// Grid emissions per kWh imported.
    pub grid_kg_per_kwh: f64,
}

impl Default for EmissionParams {
    fn default() -> Self {
        Self {
            pv_lifecycle_kg_per_kw: 1600.0,
            pv_lifetime_intervals: 219_000.0,
            pv_operational_kg_per_kwh: 0.005,
            pv_maintenance_kg_per_unit: 0.0001,
            wt_lifecycle_kg_per_kw: 700.0,
            wt_lifetime_intervals: 175_200.0,
            wt_operational_kg_per_kwh: 0.007,
            wt_maintenance_kg_per_unit: 0.001,
            grid_kg_per_kwh: 0.3,
        }
    }
}

impl EmissionParams {
    /// # Errors
    ///
    /// Returns [`crate::error::DispatchError::InvalidParameter`] for the first
    /// negative or non-finite factor, or a non-positive lifetime.
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("emissions.pv_lifecycle_kg_per_kw", self.pv_lifecycle_kg_per_kw)?;
        ensure_positive("emissions.pv_lifetime_intervals", self.pv_lifetime_intervals)?;
        ensure_non_negative(
            "emissions.pv_operational_kg_per_kwh",
            self.pv_operational_kg_per_kwh,
        )?;
        ensure_non_negative(
            "emissions.pv_maintenance_kg_per_unit",
            self.pv_maintenance_kg_per_unit,
        )?;
        ensure_non_negative("emissions.wt_lifecycle_kg_per_kw", self.wt_lifecycle_kg_per_kw)?;
        ensure_positive("emissions.wt_lifetime_intervals", self.wt_lifetime_intervals)?;
        ensure_non_negative(
            "emissions.wt_operational_kg_per_kwh",
            self.wt_operational_kg_per_kwh,
        )?;
        ensure_non_negative(
            "emissions.wt_maintenance_kg_per_unit",
            self.wt_maintenance_kg_per_unit,
        )?;
        ensure_non_negative("emissions.grid_kg_per_kwh", self.grid_kg_per_kwh)
    }
}

/// CO2 split by term (kg).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EmissionBreakdown {
    pub pv_manufacturing: f64,
    pub wt_manufacturing: f64,
    pub pv_operational: f64,
    pub wt_operational: f64,
    pub maintenance: f64,
    pub grid: f64,
}

impl EmissionBreakdown {
    pub fn total(&self) -> f64 {
        self.pv_manufacturing
            + self.wt_manufacturing
            + self.pv_operational
            + self.wt_operational
            + self.maintenance
            + self.grid
    }
}

/// Pure, stateless emission model. Mirrors [`super::economics::EconomicModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionModel {
    params: EmissionParams,
    ratings: UnitRatings,
}

impl EmissionModel {
    /// # Errors
    ///
    /// Returns an error if `params` fails [`EmissionParams::validate`].
    pub fn new(params: EmissionParams, ratings: UnitRatings) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, ratings })
    }

    pub fn params(&self) -> &EmissionParams {
        &self.params
    }

    /// Total CO2 of `action` under `state` (kg).
    pub fn co2(&self, action: &Action, state: &State) -> f64 {
        self.breakdown(action, state).total()
    }

    pub fn breakdown(&self, action: &Action, state: &State) -> EmissionBreakdown {
        let p = &self.params;
        let r = &self.ratings;

        let mut b = EmissionBreakdown {
            grid: action.grid_power.max(0.0) * p.grid_kg_per_kwh,
            ..EmissionBreakdown::default()
        };

        if action.pv_count > 0 {
            let rated_kw = f64::from(action.pv_count) * r.pv_unit_kw;
            b.pv_manufacturing = rated_kw * p.pv_lifecycle_kg_per_kw / p.pv_lifetime_intervals;
            b.pv_operational =
                r.pv_energy(action.pv_count, state.solar_cf) * p.pv_operational_kg_per_kwh;
            b.maintenance += f64::from(action.pv_count) * p.pv_maintenance_kg_per_unit;
        }
        if action.wt_count > 0 {
            let rated_kw = f64::from(action.wt_count) * r.wt_unit_kw;
            b.wt_manufacturing = rated_kw * p.wt_lifecycle_kg_per_kw / p.wt_lifetime_intervals;
            b.wt_operational =
                r.wt_energy(action.wt_count, state.wind_cf) * p.wt_operational_kg_per_kwh;
            b.maintenance += f64::from(action.wt_count) * p.wt_maintenance_kg_per_unit;
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> EmissionModel {
        EmissionModel::new(EmissionParams::default(), UnitRatings::default()).unwrap()
    }

    #[test]
    fn zero_allocation_emits_nothing() {
        let s = State::new(0.9, 0.9, 500.0, 0.3).unwrap();
        assert_eq!(model().co2(&Action::new(0, 0, 0.0), &s), 0.0);
    }

    #[test]
    fn grid_emissions_use_grid_factor() {
        let s = State::new(0.0, 0.0, 100.0, 0.3).unwrap();
        let b = model().breakdown(&Action::new(0, 0, 100.0), &s);
        assert!((b.grid - 30.0).abs() < 1e-9);
        assert!((b.total() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn operational_follows_generated_energy() {
        let params = EmissionParams {
            pv_lifecycle_kg_per_kw: 0.0,
            pv_maintenance_kg_per_unit: 0.0,
            pv_operational_kg_per_kwh: 0.01,
            ..EmissionParams::default()
        };
        let m = EmissionModel::new(params, UnitRatings::default()).unwrap();
        let s = State::new(0.5, 0.0, 0.0, 0.0).unwrap();
        let b = m.breakdown(&Action::new(100, 0, 0.0), &s);
        assert!((b.pv_operational - 0.5).abs() < 1e-12);
        assert_eq!(b.total(), b.pv_operational);
    }

    #[test]
    fn idle_units_still_carry_fixed_emissions() {
        let s = State::new(0.0, 0.0, 0.0, 0.0).unwrap();
        let b = model().breakdown(&Action::new(10, 2, 0.0), &s);
        assert_eq!(b.pv_operational, 0.0);
        assert!(b.pv_manufacturing > 0.0);
        assert!(b.maintenance > 0.0);
    }

    #[test]
    fn identical_inputs_identical_outputs() {
        let m = model();
        let s = State::new(0.4, 0.7, 120.0, 0.2).unwrap();
        let a = Action::new(60, 15, 50.0);
        assert_eq!(m.co2(&a, &s), m.co2(&a, &s));
    }
}
