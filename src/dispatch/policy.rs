//! State quantization and the read-only policy lookup capability.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::{FEASIBILITY_TOLERANCE, State};
use crate::error::{Result, ensure_positive};

/// Canonical composite key for one quantized state cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub solar_bucket: u32,
    pub wind_bucket: u32,
    pub demand_bucket: u32,
    pub price_bucket: u32,
}

/// Bucket widths for each state field.
///
/// `bucket = floor(value / width)`, so buckets are disjoint, deterministic and
/// preserve the ordering of each field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Quantizer {
    pub solar_width: f64,
    pub wind_width: f64,
    pub demand_width: f64,
    pub price_width: f64,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self {
            solar_width: 0.1,
            wind_width: 0.1,
            demand_width: 50.0,
            price_width: 0.05,
        }
    }
}

impl Quantizer {
    /// # Errors
    ///
    /// Returns [`crate::error::DispatchError::InvalidParameter`] unless every
    /// width is finite and positive.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("quantizer.solar_width", self.solar_width)?;
        ensure_positive("quantizer.wind_width", self.wind_width)?;
        ensure_positive("quantizer.demand_width", self.demand_width)?;
        ensure_positive("quantizer.price_width", self.price_width)
    }

    /// Maps a validated state to its cell.
    pub fn quantize(&self, state: &State) -> StateKey {
        StateKey {
            solar_bucket: bucket(state.solar_cf, self.solar_width),
            wind_bucket: bucket(state.wind_cf, self.wind_width),
            demand_bucket: bucket(state.demand, self.demand_width),
            price_bucket: bucket(state.grid_price, self.price_width),
        }
    }
}

// Ratios within `FEASIBILITY_TOLERANCE` below an edge belong to the upper
// bucket, so 0.15 / 0.05 lands in bucket 3 rather than 2. Saturating cast:
// very large values all share the last bucket.
fn bucket(value: f64, width: f64) -> u32 {
    (value / width + FEASIBILITY_TOLERANCE).floor() as u32
}

/// A renewable allocation suggested by the trained policy.
///
/// Carries no grid component; grid import is always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub pv_count: u32,
    pub wt_count: u32,
}

/// Read-only policy capability consulted by the dispatch engine.
pub trait PolicyLookup {
    /// Returns the suggestion for `key`, or `None` on a miss.
    fn lookup(&self, key: &StateKey) -> Option<Suggestion>;
}

impl<T: PolicyLookup + ?Sized> PolicyLookup for &T {
    fn lookup(&self, key: &StateKey) -> Option<Suggestion> {
        (**self).lookup(key)
    }
}

impl<T: PolicyLookup + ?Sized> PolicyLookup for Arc<T> {
    fn lookup(&self, key: &StateKey) -> Option<Suggestion> {
        (**self).lookup(key)
    }
}

/// Stand-in for an absent policy: every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPolicy;

impl PolicyLookup for NoPolicy {
    fn lookup(&self, _key: &StateKey) -> Option<Suggestion> {
        None
    }
}

/// Hash-map backed policy table. Built once, then only read.
#[derive(Debug, Default, Clone)]
pub struct PolicyTable {
    entries: HashMap<StateKey, Suggestion>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds or replaces an entry while the table is being assembled.
    pub fn insert(&mut self, key: StateKey, suggestion: Suggestion) -> Option<Suggestion> {
        self.entries.insert(key, suggestion)
    }
}

impl FromIterator<(StateKey, Suggestion)> for PolicyTable {
    fn from_iter<I: IntoIterator<Item = (StateKey, Suggestion)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl PolicyLookup for PolicyTable {
    fn lookup(&self, key: &StateKey) -> Option<Suggestion> {
        self.entries.get(key).copied()
    }
}
