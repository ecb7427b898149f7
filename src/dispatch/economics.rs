//! Per-interval monetary cost of an allocation.

use serde::{Deserialize, Serialize};

use super::types::{Action, State, UnitRatings};
use crate::error::{Result, ensure_non_negative, ensure_positive};

/// Cost parameters, all expressed per kW of rated power or per interval.
///
/// Defaults assume one-hour intervals: PV at 2.75 $/W over 25 years, wind at
/// 1500 $/kW over 20 years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicParams {
    /// PV capital cost per kW of rated power.
    pub pv_capital_cost_per_kw: f64,
    /// PV lifetime in intervals (must be > 0).
    pub pv_lifetime_intervals: f64,
    /// PV O&M cost per kW per interval.
    pub pv_om_cost_per_kw_interval: f64,
    /// Land occupied by one panel (m²).
    pub pv_area_m2: f64,
    /// Wind capital cost per kW of rated power.
    pub wt_capital_cost_per_kw: f64,
    /// Wind lifetime in intervals (must be > 0).
    pub wt_lifetime_intervals: f64,
    /// Wind O&M cost per kW per interval.
    pub wt_om_cost_per_kw_interval: f64,
    /// Land occupied by one turbine (m²).
    pub wt_area_m2: f64,
    /// Land lease per m² per interval.
    pub lease_rate_per_m2_interval: f64,
}

impl Default for EconomicParams {
    fn default() -> Self {
        Self {
            pv_capital_cost_per_kw: 2750.0,
            pv_lifetime_intervals: 219_000.0,
            pv_om_cost_per_kw_interval: 0.0095,
            pv_area_m2: 5.5,
            wt_capital_cost_per_kw: 1500.0,
            wt_lifetime_intervals: 175_200.0,
            wt_om_cost_per_kw_interval: 0.00057,
            wt_area_m2: 12.0,
            lease_rate_per_m2_interval: 0.0001,
        }
    }
}

impl EconomicParams {
    /// Checks every parameter is finite and non-negative, lifetimes positive.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DispatchError::InvalidParameter`] for the first
    /// offending field.
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("economics.pv_capital_cost_per_kw", self.pv_capital_cost_per_kw)?;
        ensure_positive("economics.pv_lifetime_intervals", self.pv_lifetime_intervals)?;
        ensure_non_negative(
            "economics.pv_om_cost_per_kw_interval",
            self.pv_om_cost_per_kw_interval,
        )?;
        ensure_non_negative("economics.pv_area_m2", self.pv_area_m2)?;
        ensure_non_negative("economics.wt_capital_cost_per_kw", self.wt_capital_cost_per_kw)?;
        ensure_positive("economics.wt_lifetime_intervals", self.wt_lifetime_intervals)?;
        ensure_non_negative(
            "economics.wt_om_cost_per_kw_interval",
            self.wt_om_cost_per_kw_interval,
        )?;
        ensure_non_negative("economics.wt_area_m2", self.wt_area_m2)?;
        ensure_non_negative(
            "economics.lease_rate_per_m2_interval",
            self.lease_rate_per_m2_interval,
        )
    }
}

/// Cost split by term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub pv_capital: f64,
    pub wt_capital: f64,
    pub pv_om: f64,
    pub wt_om: f64,
    pub grid: f64,
    pub land: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.pv_capital + self.wt_capital + self.pv_om + self.wt_om + self.grid + self.land
    }
}

/// Pure, stateless cost model.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomicModel {
    params: EconomicParams,
    ratings: UnitRatings,
}

impl EconomicModel {
    /// # Errors
    ///
    /// Returns an error if `params` fails [`EconomicParams::validate`].
    pub fn new(params: EconomicParams, ratings: UnitRatings) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, ratings })
    }

    pub fn params(&self) -> &EconomicParams {
        &self.params
    }

    /// Total cost of `action` under `state`.
    pub fn cost(&self, action: &Action, state: &State) -> f64 {
        self.breakdown(action, state).total()
    }

    /// Cost of `action` under `state`, term by term.
    pub fn breakdown(&self, action: &Action, state: &State) -> CostBreakdown {
        let p = &self.params;
        let (pv_capital, pv_om, pv_land) = source_costs(
            action.pv_count,
            self.ratings.pv_unit_kw,
            p.pv_capital_cost_per_kw,
            p.pv_lifetime_intervals,
            p.pv_om_cost_per_kw_interval,
            p.pv_area_m2,
        );
        let (wt_capital, wt_om, wt_land) = source_costs(
            action.wt_count,
            self.ratings.wt_unit_kw,
            p.wt_capital_cost_per_kw,
            p.wt_lifetime_intervals,
            p.wt_om_cost_per_kw_interval,
            p.wt_area_m2,
        );

        // Export is never paid for.
        let grid = action.grid_power.max(0.0) * state.grid_price;

        CostBreakdown {
            pv_capital,
            wt_capital,
            pv_om,
            wt_om,
            grid,
            land: (pv_land + wt_land) * p.lease_rate_per_m2_interval,
        }
    }
}

/// Returns `(capital, om, land_area)` for one source.
fn source_costs(
    count: u32,
    unit_kw: f64,
    capital_per_kw: f64,
    lifetime_intervals: f64,
    om_per_kw_interval: f64,
    area_m2: f64,
) -> (f64, f64, f64) {
    if count == 0 {
        return (0.0, 0.0, 0.0);
    }
    let rated_kw = f64::from(count) * unit_kw;
    (
        rated_kw * capital_per_kw / lifetime_intervals,
        rated_kw * om_per_kw_interval,
        f64::from(count) * area_m2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> EconomicModel {
        EconomicModel::new(EconomicParams::default(), UnitRatings::default()).unwrap()
    }

    fn state(price: f64) -> State {
        State::new(0.6, 0.4, 100.0, price).unwrap()
    }

    #[test]
    fn zero_allocation_costs_nothing() {
        let m = model();
        assert_eq!(m.cost(&Action::new(0, 0, 0.0), &state(0.15)), 0.0);
    }

    #[test]
    fn grid_term_is_power_times_price() {
        let m = model();
        let b = m.breakdown(&Action::new(0, 0, 100.0), &state(0.15));
        assert!((b.grid - 15.0).abs() < 1e-12);
        assert_eq!(b.pv_capital, 0.0);
        assert_eq!(b.land, 0.0);
    }

    #[test]
    fn negative_grid_is_not_revenue() {
        let m = model();
        let b = m.breakdown(&Action::new(0, 0, -50.0), &state(0.15));
        assert_eq!(b.grid, 0.0);
    }

    #[test]
    fn capital_is_amortized_over_lifetime() {
        let params = EconomicParams {
            pv_capital_cost_per_kw: 1000.0,
            pv_lifetime_intervals: 100.0,
            pv_om_cost_per_kw_interval: 0.0,
            pv_area_m2: 0.0,
            ..EconomicParams::default()
        };
        let m = EconomicModel::new(params, UnitRatings::new(2.0, 1.0, 1.0).unwrap()).unwrap();
        let b = m.breakdown(&Action::new(5, 0, 0.0), &state(0.0));
        // 5 panels * 2 kW * 1000 / 100
        assert!((b.pv_capital - 100.0).abs() < 1e-9);
        assert_eq!(b.wt_capital, 0.0);
    }

    #[test]
    fn land_counts_both_sources() {
        let params = EconomicParams {
            pv_area_m2: 2.0,
            wt_area_m2: 10.0,
            lease_rate_per_m2_interval: 0.5,
            ..EconomicParams::default()
        };
        let m = EconomicModel::new(params, UnitRatings::default()).unwrap();
        let b = m.breakdown(&Action::new(3, 2, 0.0), &state(0.0));
        assert!((b.land - (3.0 * 2.0 + 2.0 * 10.0) * 0.5).abs() < 1e-12);
    }

    #[test]
    fn higher_price_never_lowers_cost() {
        let m = model();
        let a = Action::new(50, 20, 100.0);
        let mut last = m.cost(&a, &state(0.0));
        for i in 1..20 {
            let c = m.cost(&a, &state(f64::from(i) * 0.05));
            assert!(c >= last);
            last = c;
        }
    }

    #[test]
    fn rejects_zero_lifetime() {
        let params = EconomicParams {
            wt_lifetime_intervals: 0.0,
            ..EconomicParams::default()
        };
        assert!(EconomicModel::new(params, UnitRatings::default()).is_err());
    }
}
