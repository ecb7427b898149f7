//! Wind capacity factor with smoothed random variability and occasional gusts.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::profiles::types::{ResourceProfile, gaussian};

/// Parameters of the wind series.
///
/// Each hour draws
///
/// ```text
/// f(t) = clamp(base(t) + N(noise_mean, noise_std), min_factor, max_factor)
/// base(t+1) = smoothing * base(t) + (1 - smoothing) * f(t)
/// ```
///
/// and with probability `gust_probability` adds `gust_boost` to `f(t)`
/// (still capped at `max_factor`). The gust does not feed back into `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindParams {
    pub initial_base: f64,
    pub noise_mean: f64,
    pub noise_std: f64,
    pub min_factor: f64,
    pub max_factor: f64,
    /// Weight of the previous base (0.0 to 1.0).
    pub smoothing: f64,
    pub gust_probability: f64,
    pub gust_boost: f64,
}

impl Default for WindParams {
    fn default() -> Self {
        Self {
            initial_base: 0.45,
            noise_mean: 0.05,
            noise_std: 0.12,
            min_factor: 0.2,
            max_factor: 0.95,
            smoothing: 0.65,
            gust_probability: 0.15,
            gust_boost: 0.2,
        }
    }
}

/// Seeded wind profile. Identical seeds yield identical series.
#[derive(Debug, Clone)]
pub struct WindProfile {
    params: WindParams,
    base: f64,
    rng: StdRng,
}

impl WindProfile {
    /// Creates a wind profile.
    ///
    /// # Arguments
    ///
    /// * `params` - Series parameters; non-finite values fall back to the
    ///   defaults, `smoothing` and `gust_probability` are clamped to `[0, 1]`,
    ///   factor bounds to `[0, 1]`
    /// * `seed` - Random seed for reproducible series
    pub fn new(params: WindParams, seed: u64) -> Self {
        let d = WindParams::default();
        let min_factor = finite_or(params.min_factor, d.min_factor).clamp(0.0, 1.0);
        let max_factor = finite_or(params.max_factor, d.max_factor).clamp(min_factor, 1.0);
        let params = WindParams {
            initial_base: finite_or(params.initial_base, d.initial_base),
            noise_mean: finite_or(params.noise_mean, d.noise_mean),
            noise_std: finite_or(params.noise_std, d.noise_std).max(0.0),
            min_factor,
            max_factor,
            smoothing: finite_or(params.smoothing, d.smoothing).clamp(0.0, 1.0),
            gust_probability: finite_or(params.gust_probability, d.gust_probability)
                .clamp(0.0, 1.0),
            gust_boost: finite_or(params.gust_boost, d.gust_boost),
        };
        Self {
            base: params.initial_base,
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn params(&self) -> &WindParams {
        &self.params
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

impl ResourceProfile for WindProfile {
    /// Advances the series by one hour. `hour` is not used; the series is
    /// driven by call order.
    fn capacity_factor(&mut self, _hour: usize) -> f64 {
        let p = &self.params;
        let noise = gaussian(&mut self.rng, p.noise_mean, p.noise_std);
        let factor = (self.base + noise).clamp(p.min_factor, p.max_factor);
        self.base = p.smoothing * self.base + (1.0 - p.smoothing) * factor;

        if self.rng.random::<f64>() < p.gust_probability {
            (factor + p.gust_boost).min(p.max_factor)
        } else {
            factor
        }
    }

    fn profile_type(&self) -> &'static str {
        "Wind"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_series() {
        let mut a = WindProfile::new(WindParams::default(), 42);
        let mut b = WindProfile::new(WindParams::default(), 42);
        assert_eq!(a.series(48), b.series(48));
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = WindProfile::new(WindParams::default(), 42);
        let mut b = WindProfile::new(WindParams::default(), 43);
        assert_ne!(a.series(24), b.series(24));
    }

    #[test]
    fn stays_within_bounds() {
        let mut w = WindProfile::new(WindParams::default(), 7);
        for cf in w.series(500) {
            assert!((0.2..=0.95).contains(&cf), "cf out of bounds: {cf}");
        }
    }

    #[test]
    fn no_noise_no_gust_converges_to_base_plus_mean() {
        let params = WindParams {
            noise_std: 0.0,
            noise_mean: 0.0,
            gust_probability: 0.0,
            ..WindParams::default()
        };
        let mut w = WindProfile::new(params, 1);
        for cf in w.series(10) {
            assert!((cf - 0.45).abs() < 1e-12);
        }
    }

    #[test]
    fn bounds_are_clamped_to_unit_interval() {
        let params = WindParams {
            max_factor: 3.0,
            ..WindParams::default()
        };
        let w = WindProfile::new(params, 1);
        assert_eq!(w.params().max_factor, 1.0);
    }

    #[test]
    fn nan_bounds_fall_back_to_defaults() {
        let params = WindParams {
            min_factor: f64::NAN,
            max_factor: f64::NAN,
            gust_boost: f64::INFINITY,
            ..WindParams::default()
        };
        let mut w = WindProfile::new(params, 3);
        assert_eq!(w.params().min_factor, 0.2);
        assert_eq!(w.params().max_factor, 0.95);
        assert!(w.series(48).iter().all(|cf| (0.2..=0.95).contains(cf)));
    }
}
