/// Discretized level sets for panels, turbines, and grid import.
pub mod action_space;
pub mod corrector;
/// Monetary cost model.
pub mod economics;
/// CO2 emission model.
pub mod emissions;
pub mod engine;
/// State quantization and policy lookup.
pub mod policy;
pub mod types;
