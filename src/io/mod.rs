/// CSV and JSON export for dispatch results.
pub mod export;
/// Policy table loading.
pub mod policy;
