//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::dispatch::action_space::ActionSpace;
use crate::dispatch::economics::EconomicParams;
use crate::dispatch::emissions::EmissionParams;
use crate::dispatch::policy::Quantizer;
use crate::dispatch::types::UnitRatings;
use crate::error::DispatchError;
use crate::horizon::baseline::NaiveBaseline;
use crate::horizon::kpi::ObjectiveWeights;
use crate::profiles::{SolarProfile, WindParams};

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Horizon length, seed, demand, price, and objective weights.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Level sets for panels, turbines, and grid import.
    #[serde(default)]
    pub action_space: ActionSpaceConfig,
    /// Rated power per unit and interval length.
    #[serde(default)]
    pub ratings: UnitRatings,
    /// Cost model parameters.
    #[serde(default)]
    pub economics: EconomicParams,
    /// Emission model parameters.
    #[serde(default)]
    pub emissions: EmissionParams,
    /// Policy key bucket widths.
    #[serde(default)]
    pub quantizer: Quantizer,
    /// Solar day/night profile.
    #[serde(default)]
    pub solar: SolarProfile,
    /// Wind series parameters.
    #[serde(default)]
    pub wind: WindParams,
    /// Fixed-allocation comparison strategy.
    #[serde(default)]
    pub baseline: NaiveBaseline,
}

/// Horizon length, seed, and per-interval demand and price.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of hourly intervals to dispatch (must be > 0).
    pub hours: usize,
    /// Master random seed.
    pub seed: u64,
    /// Demand per interval (kWh).
    pub demand: f64,
    /// Grid price (currency per kWh).
    pub grid_price: f64,
    /// Weight of cost in the combined objective.
    pub cost_weight: f64,
    /// Weight of CO2 in the combined objective.
    pub co2_weight: f64,
    /// Optional policy table CSV.
    pub policy_path: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            hours: 24,
            seed: 42,
            demand: 100.0,
            grid_price: 0.15,
            cost_weight: 1.0,
            co2_weight: 1.0,
            policy_path: None,
        }
    }
}

impl SimulationConfig {
    pub fn weights(&self) -> ObjectiveWeights {
        ObjectiveWeights {
            cost_weight: self.cost_weight,
            co2_weight: self.co2_weight,
        }
    }
}

/// Level sets as written in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionSpaceConfig {
    pub pv_levels: Vec<u32>,
    pub wt_levels: Vec<u32>,
    pub grid_levels: Vec<f64>,
}

impl Default for ActionSpaceConfig {
    fn default() -> Self {
        Self {
            pv_levels: (0..=300).step_by(10).collect(),
            wt_levels: (0..=50).step_by(5).collect(),
            grid_levels: (0..=20).map(|i| f64::from(i) * 50.0).collect(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.hours"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<DispatchError> for ConfigError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::InvalidActionSpace { dimension, reason } => {
                Self::new(format!("action_space.{dimension}_levels"), reason)
            }
            DispatchError::InvalidParameter { field, reason } => Self::new(field, reason),
            DispatchError::InvalidState { field, reason, .. } => {
                Self::new(format!("simulation.{field}"), reason)
            }
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the low-wind preset: weak, calm wind and higher demand.
    pub fn low_wind() -> Self {
        Self {
            simulation: SimulationConfig {
                demand: 150.0,
                ..SimulationConfig::default()
            },
            wind: WindParams {
                initial_base: 0.25,
                noise_mean: 0.0,
                noise_std: 0.08,
                min_factor: 0.05,
                max_factor: 0.6,
                gust_probability: 0.05,
                ..WindParams::default()
            },
            ..Self::default()
        }
    }

    /// Returns the grid-constrained preset: small grid connection, expensive
    /// import, demand close to total capacity at night.
    pub fn grid_constrained() -> Self {
        Self {
            simulation: SimulationConfig {
                demand: 250.0,
                grid_price: 0.30,
                ..SimulationConfig::default()
            },
            action_space: ActionSpaceConfig {
                grid_levels: (0..=8).map(|i| f64::from(i) * 25.0).collect(),
                ..ActionSpaceConfig::default()
            },
            baseline: NaiveBaseline {
                grid_power: 200.0,
                ..NaiveBaseline::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "low_wind", "grid_constrained"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "low_wind" => Ok(Self::low_wind()),
            "grid_constrained" => Ok(Self::grid_constrained()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Builds the validated action space.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the offending level set.
    pub fn action_space(&self) -> Result<ActionSpace, ConfigError> {
        let a = &self.action_space;
        ActionSpace::new(
            a.pv_levels.clone(),
            a.wt_levels.clone(),
            a.grid_levels.clone(),
        )
        .map_err(ConfigError::from)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.hours == 0 {
            errors.push(ConfigError::new("simulation.hours", "must be > 0"));
        }
        for (field, value) in [
            ("simulation.demand", s.demand),
            ("simulation.grid_price", s.grid_price),
            ("simulation.cost_weight", s.cost_weight),
            ("simulation.co2_weight", s.co2_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(field, "must be finite and >= 0"));
            }
        }

        if let Err(e) = self.action_space() {
            errors.push(e);
        }
        if let Err(e) = UnitRatings::new(
            self.ratings.pv_unit_kw,
            self.ratings.wt_unit_kw,
            self.ratings.interval_hours,
        ) {
            errors.push(e.into());
        }
        if let Err(e) = self.economics.validate() {
            errors.push(e.into());
        }
        if let Err(e) = self.emissions.validate() {
            errors.push(e.into());
        }
        if let Err(e) = self.quantizer.validate() {
            errors.push(e.into());
        }

        let sol = &self.solar;
        if sol.sunrise_hour > sol.sunset_hour {
            errors.push(ConfigError::new(
                "solar.sunrise_hour",
                "must be <= solar.sunset_hour",
            ));
        }
        if sol.sunset_hour > 23 {
            errors.push(ConfigError::new("solar.sunset_hour", "must be <= 23"));
        }
        if !(sol.half_width.is_finite() && sol.half_width > 0.0) {
            errors.push(ConfigError::new("solar.half_width", "must be > 0"));
        }

        let w = &self.wind;
        for (field, value) in [
            ("wind.initial_base", w.initial_base),
            ("wind.noise_mean", w.noise_mean),
            ("wind.noise_std", w.noise_std),
            ("wind.min_factor", w.min_factor),
            ("wind.max_factor", w.max_factor),
            ("wind.smoothing", w.smoothing),
            ("wind.gust_probability", w.gust_probability),
            ("wind.gust_boost", w.gust_boost),
        ] {
            if !value.is_finite() {
                errors.push(ConfigError::new(field, "must be finite"));
            }
        }
        if w.noise_std < 0.0 {
            errors.push(ConfigError::new("wind.noise_std", "must be >= 0"));
        }
        for (field, value) in [
            ("wind.min_factor", w.min_factor),
            ("wind.max_factor", w.max_factor),
        ] {
            if value.is_finite() && !(0.0..=1.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        }
        if w.min_factor > w.max_factor {
            errors.push(ConfigError::new(
                "wind.min_factor",
                "must be <= wind.max_factor",
            ));
        }
        if !(0.0..=1.0).contains(&w.smoothing) {
            errors.push(ConfigError::new("wind.smoothing", "must be in [0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&w.gust_probability) {
            errors.push(ConfigError::new(
                "wind.gust_probability",
                "must be in [0.0, 1.0]",
            ));
        }

        let b = &self.baseline;
        if !(b.grid_power.is_finite() && b.grid_power >= 0.0) {
            errors.push(ConfigError::new("baseline.grid_power", "must be >= 0"));
        }
        if !(b.max_energy.is_finite() && b.max_energy >= 0.0) {
            errors.push(ConfigError::new("baseline.max_energy", "must be >= 0"));
        }

        errors
    }
}
