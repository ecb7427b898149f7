use serde::{Deserialize, Serialize};

use crate::profiles::types::ResourceProfile;

/// Deterministic day/night solar capacity factor.
///
/// Between `sunrise_hour` and `sunset_hour` (both inclusive) the factor is a
/// triangle peaking at noon:
///
/// ```text
/// cf(h) = day_floor + day_span * (1 - |h - 12| / half_width)
/// ```
///
/// Outside daylight it stays at `night_factor`. Hours wrap every 24.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarProfile {
    /// First daylight hour of the day (inclusive).
    pub sunrise_hour: usize,
    /// Last daylight hour of the day (inclusive).
    pub sunset_hour: usize,
    /// Capacity factor at the edges of the triangle.
    pub day_floor: f64,
    /// Additional capacity factor at noon.
    pub day_span: f64,
    /// Hours from noon at which the triangle reaches `day_floor`.
    pub half_width: f64,
    /// Capacity factor outside daylight.
    pub night_factor: f64,
}

impl Default for SolarProfile {
    fn default() -> Self {
        Self {
            sunrise_hour: 6,
            sunset_hour: 18,
            day_floor: 0.2,
            day_span: 0.75,
            half_width: 6.5,
            night_factor: 0.08,
        }
    }
}

impl SolarProfile {
    /// Capacity factor at hour-of-day `h` (0..24), clamped to `[0, 1]`.
    pub fn factor_at(&self, hour_of_day: usize) -> f64 {
        let cf = if (self.sunrise_hour..=self.sunset_hour).contains(&hour_of_day) {
            let offset = (hour_of_day as f64 - 12.0).abs();
            let peak = (1.0 - offset / self.half_width).max(0.0);
            self.day_floor + self.day_span * peak
        } else {
            self.night_factor
        };
        cf.clamp(0.0, 1.0)
    }
}

impl ResourceProfile for SolarProfile {
    fn capacity_factor(&mut self, hour: usize) -> f64 {
        self.factor_at(hour % 24)
    }

    fn profile_type(&self) -> &'static str {
        "Solar"
    }
}
