//! Loading policy tables from CSV.
//!
//! One row per state key:
//!
//! ```text
//! solar_bucket,wind_bucket,demand_bucket,price_bucket,pv_count,wt_count
//! 6,4,2,3,50,20
//! ```
//!
//! Later rows overwrite earlier rows with the same key.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::dispatch::policy::{PolicyTable, StateKey, Suggestion};

#[derive(Debug, Error)]
pub enum PolicyLoadError {
    #[error("cannot open policy file: {0}")]
    Io(#[from] io::Error),

    #[error("malformed policy CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("policy row {row}: {reason}")]
    Row { row: usize, reason: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyRow {
    solar_bucket: u32,
    wind_bucket: u32,
    demand_bucket: u32,
    price_bucket: u32,
    pv_count: u32,
    wt_count: u32,
}

/// Reads a policy table from a CSV file.
///
/// # Errors
///
/// Returns [`PolicyLoadError`] if the file cannot be opened or a row is
/// malformed.
pub fn load_policy_csv(path: &Path) -> Result<PolicyTable, PolicyLoadError> {
    let file = File::open(path)?;
    let table = read_policy_csv(io::BufReader::new(file))?;
    info!(path = %path.display(), entries = table.len(), "policy loaded");
    Ok(table)
}

/// Reads a policy table from any CSV source with a header row.
///
/// # Errors
///
/// Returns [`PolicyLoadError::Csv`] on parse failures and
/// [`PolicyLoadError::Row`] for rows with missing or extra columns.
pub fn read_policy_csv(reader: impl Read) -> Result<PolicyTable, PolicyLoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut table = PolicyTable::new();

    for (i, record) in rdr.deserialize::<PolicyRow>().enumerate() {
        // Header is line 1.
        let row = i + 2;
        let r = record.map_err(|e| {
            let bad_row = matches!(
                e.kind(),
                csv::ErrorKind::Deserialize { .. } | csv::ErrorKind::UnequalLengths { .. }
            );
            if bad_row {
                PolicyLoadError::Row {
                    row,
                    reason: e.to_string(),
                }
            } else {
                PolicyLoadError::Csv(e)
            }
        })?;
        let key = StateKey {
            solar_bucket: r.solar_bucket,
            wind_bucket: r.wind_bucket,
            demand_bucket: r.demand_bucket,
            price_bucket: r.price_bucket,
        };
        let suggestion = Suggestion {
            pv_count: r.pv_count,
            wt_count: r.wt_count,
        };
        if table.insert(key, suggestion).is_some() {
            warn!(row, ?key, "duplicate policy key, keeping later row");
        }
    }

    Ok(table)
}
