//! Hybrid PV/wind/grid energy dispatch.
//!
//! Each interval the [`dispatch::engine::DispatchEngine`] quantizes the
//! environment state, asks a policy table for a panel/turbine count, repairs
//! the suggestion into the cheapest feasible allocation on the action grid,
//! and scores it for cost and CO2. [`horizon`] drives the engine over a
//! generated day and compares it to a fixed-allocation baseline.

/// Scenario configuration and presets.
pub mod config;
/// Per-interval dispatch: state, action space, models, corrector, engine.
pub mod dispatch;
pub mod error;
/// Multi-interval runs, summaries, and the naive baseline.
pub mod horizon;
pub mod io;
/// Solar and wind capacity factor profiles.
pub mod profiles;
