pub mod baseline;
pub mod kpi;
pub mod runner;
