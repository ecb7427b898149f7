//! CSV and JSON export for dispatch results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::dispatch::types::DispatchResult;
use crate::horizon::kpi::HorizonSummary;

/// Column header for per-interval CSV export.
const HEADER: &str = "hour,solar_cf,wind_cf,demand,grid_price,pv_count,wt_count,\
                       grid_power,renewable_energy,total_energy,cost,co2,\
                       demand_met,candidate_source";

/// Exports dispatch results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per interval. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[DispatchResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes dispatch results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[DispatchResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for (hour, r) in results.iter().enumerate() {
        wtr.write_record(&[
            hour.to_string(),
            format!("{:.4}", r.state.solar_cf),
            format!("{:.4}", r.state.wind_cf),
            format!("{:.4}", r.state.demand),
            format!("{:.4}", r.state.grid_price),
            r.pv_count.to_string(),
            r.wt_count.to_string(),
            format!("{:.4}", r.grid_power),
            format!("{:.4}", r.renewable_energy),
            format!("{:.4}", r.total_energy),
            format!("{:.6}", r.cost),
            format!("{:.6}", r.co2),
            r.demand_met.to_string(),
            r.candidate_source.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Run-level JSON report: engine and baseline summaries side by side.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub scenario: &'a str,
    pub seed: u64,
    pub engine: &'a HorizonSummary,
    pub baseline: &'a HorizonSummary,
    pub baseline_cap_violations: usize,
}

/// Writes the report as pretty-printed JSON to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization, or writing fails.
pub fn export_report(report: &RunReport<'_>, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut buf = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut buf, report)?;
    buf.write_all(b"\n")?;
    buf.flush()
}
