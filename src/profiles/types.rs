//! Common types and traits for hourly resource profiles.

use rand::{Rng, rngs::StdRng};

/// Trait for a source of hourly capacity factors.
///
/// Profiles may carry internal state (smoothing, a seeded RNG), so successive
/// calls for increasing hours form one realisation of the series.
pub trait ResourceProfile {
    /// Returns the capacity factor for `hour` (0.0 to 1.0).
    ///
    /// # Arguments
    ///
    /// * `hour` - Hour index from the start of the horizon
    fn capacity_factor(&mut self, hour: usize) -> f64;

    /// Returns a human-readable name for the profile.
    fn profile_type(&self) -> &'static str;

    /// Collects `hours` consecutive capacity factors starting at hour 0.
    fn series(&mut self, hours: usize) -> Vec<f64> {
        (0..hours).map(|h| self.capacity_factor(h)).collect()
    }
}

/// Gaussian sample with the given mean and standard deviation (Box-Muller).
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `mean` - Mean of the distribution
/// * `std_dev` - Standard deviation; values `<= 0` return `mean`
pub fn gaussian(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return mean;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + z0 * std_dev
}
