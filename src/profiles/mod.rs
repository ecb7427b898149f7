//! Hourly resource profiles that feed the horizon runner.

/// Day/night solar capacity factor.
pub mod solar;
pub mod types;
/// Smoothed random wind capacity factor.
pub mod wind;

pub use solar::SolarProfile;
pub use types::ResourceProfile;
pub use wind::{WindParams, WindProfile};
