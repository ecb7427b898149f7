//! Discretized action space shared by the policy table and the corrector.

use serde::Serialize;

use crate::error::{DispatchError, Result};

/// Three finite, strictly ascending level sets, each starting at zero.
///
/// The external training process and the corrector must agree on these sets;
/// every [`Action`](super::types::Action) the engine emits is drawn from them.
///
/// # Examples
///
/// ```
/// use hybrid_dispatch::dispatch::action_space::ActionSpace;
///
/// let space = ActionSpace::new(vec![0, 10, 20], vec![0, 5], vec![0.0, 50.0, 100.0]).unwrap();
/// assert_eq!(space.max_grid(), 100.0);
/// assert!(ActionSpace::new(vec![], vec![0], vec![0.0]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSpace {
    pv_levels: Vec<u32>,
    wt_levels: Vec<u32>,
    grid_levels: Vec<f64>,
}

impl ActionSpace {
    /// Builds a validated action space.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidActionSpace`] if any set is empty, does
    /// not start at zero, is not strictly ascending, or (for grid levels)
    /// contains a non-finite value.
    pub fn new(pv_levels: Vec<u32>, wt_levels: Vec<u32>, grid_levels: Vec<f64>) -> Result<Self> {
        check_counts("pv", &pv_levels)?;
        check_counts("wt", &wt_levels)?;
        check_grid(&grid_levels)?;
        Ok(Self {
            pv_levels,
            wt_levels,
            grid_levels,
        })
    }

    /// Evenly spaced levels `0, step, 2*step, ..` up to and including `max`.
    ///
    /// # Errors
    ///
    /// Same as [`ActionSpace::new`]; a zero step is rejected.
    pub fn uniform(
        pv_max: u32,
        pv_step: u32,
        wt_max: u32,
        wt_step: u32,
        grid_max: f64,
        grid_step: f64,
    ) -> Result<Self> {
        if pv_step == 0 || wt_step == 0 {
            return Err(DispatchError::InvalidActionSpace {
                dimension: if pv_step == 0 { "pv" } else { "wt" },
                reason: "step must be > 0",
            });
        }
        if !(grid_step.is_finite() && grid_step > 0.0) || !grid_max.is_finite() {
            return Err(DispatchError::InvalidActionSpace {
                dimension: "grid",
                reason: "step must be finite and > 0",
            });
        }
        let pv = (0..=pv_max).step_by(pv_step as usize).collect();
        let wt = (0..=wt_max).step_by(wt_step as usize).collect();
        let n = (grid_max / grid_step).floor() as usize;
        let grid = (0..=n).map(|i| i as f64 * grid_step).collect();
        Self::new(pv, wt, grid)
    }

    pub fn pv_levels(&self) -> &[u32] {
        &self.pv_levels
    }

    pub fn wt_levels(&self) -> &[u32] {
        &self.wt_levels
    }

    pub fn grid_levels(&self) -> &[f64] {
        &self.grid_levels
    }

    /// Largest grid import level.
    pub fn max_grid(&self) -> f64 {
        self.grid_levels.last().copied().unwrap_or(0.0)
    }

    /// Largest PV count.
    pub fn max_pv(&self) -> u32 {
        self.pv_levels.last().copied().unwrap_or(0)
    }

    /// Largest turbine count.
    pub fn max_wt(&self) -> u32 {
        self.wt_levels.last().copied().unwrap_or(0)
    }

    /// Smallest grid level `>= required`, scanning ascending.
    ///
    /// Returns `None` when even the largest level falls short.
    pub fn min_grid_at_least(&self, required: f64) -> Option<f64> {
        self.grid_levels.iter().copied().find(|&g| g >= required)
    }

    /// Snaps a PV suggestion onto the level set.
    pub fn snap_pv(&self, pv_count: u32) -> u32 {
        snap_up(&self.pv_levels, pv_count)
    }

    /// Snaps a turbine suggestion onto the level set.
    pub fn snap_wt(&self, wt_count: u32) -> u32 {
        snap_up(&self.wt_levels, wt_count)
    }
}

/// Smallest level `>= value`, or the largest level if `value` is above all.
fn snap_up(levels: &[u32], value: u32) -> u32 {
    levels
        .iter()
        .copied()
        .find(|&l| l >= value)
        .or_else(|| levels.last().copied())
        .unwrap_or(0)
}

fn check_counts(dimension: &'static str, levels: &[u32]) -> Result<()> {
    match levels.first() {
        None => Err(DispatchError::InvalidActionSpace {
            dimension,
            reason: "must not be empty",
        }),
        Some(&first) if first != 0 => Err(DispatchError::InvalidActionSpace {
            dimension,
            reason: "must start at 0",
        }),
        Some(_) if levels.windows(2).any(|w| w[0] >= w[1]) => {
            Err(DispatchError::InvalidActionSpace {
                dimension,
                reason: "must be strictly ascending",
            })
        }
        Some(_) => Ok(()),
    }
}

fn check_grid(levels: &[f64]) -> Result<()> {
    let dimension = "grid";
    if levels.is_empty() {
        return Err(DispatchError::InvalidActionSpace {
            dimension,
            reason: "must not be empty",
        });
    }
    if levels.iter().any(|g| !g.is_finite()) {
        return Err(DispatchError::InvalidActionSpace {
            dimension,
            reason: "must be finite",
        });
    }
    if levels[0] != 0.0 {
        return Err(DispatchError::InvalidActionSpace {
            dimension,
            reason: "must start at 0",
        });
    }
    if levels.windows(2).any(|w| w[0] >= w[1]) {
        return Err(DispatchError::InvalidActionSpace {
            dimension,
            reason: "must be strictly ascending",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> ActionSpace {
        ActionSpace::new(vec![0, 10, 20, 50], vec![0, 5, 20], vec![0.0, 50.0, 100.0, 150.0])
            .unwrap()
    }

    #[test]
    fn rejects_empty_sets() {
        for (pv, wt, grid) in [
            (vec![], vec![0], vec![0.0]),
            (vec![0], vec![], vec![0.0]),
            (vec![0], vec![0], vec![]),
        ] {
            let err = ActionSpace::new(pv, wt, grid).unwrap_err();
            assert!(matches!(err, DispatchError::InvalidActionSpace { .. }));
        }
    }

    #[test]
    fn rejects_missing_zero() {
        let err = ActionSpace::new(vec![5, 10], vec![0], vec![0.0]).unwrap_err();
        assert_eq!(
            err,
            DispatchError::InvalidActionSpace {
                dimension: "pv",
                reason: "must start at 0",
            }
        );
        assert!(ActionSpace::new(vec![0], vec![0], vec![10.0, 20.0]).is_err());
    }

    #[test]
    fn rejects_unsorted_or_duplicate() {
        assert!(ActionSpace::new(vec![0, 20, 10], vec![0], vec![0.0]).is_err());
        assert!(ActionSpace::new(vec![0], vec![0, 5, 5], vec![0.0]).is_err());
        assert!(ActionSpace::new(vec![0], vec![0], vec![0.0, 50.0, 50.0]).is_err());
    }

    #[test]
    fn rejects_non_finite_grid() {
        assert!(ActionSpace::new(vec![0], vec![0], vec![0.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn uniform_includes_max() {
        let s = ActionSpace::uniform(300, 10, 50, 5, 1000.0, 50.0).unwrap();
        assert_eq!(s.pv_levels().len(), 31);
        assert_eq!(s.max_pv(), 300);
        assert_eq!(s.wt_levels().len(), 11);
        assert_eq!(s.grid_levels().len(), 21);
        assert_eq!(s.max_grid(), 1000.0);
    }

    #[test]
    fn uniform_rejects_zero_step() {
        assert!(ActionSpace::uniform(10, 0, 10, 1, 10.0, 1.0).is_err());
        assert!(ActionSpace::uniform(10, 1, 10, 1, 10.0, 0.0).is_err());
    }

    #[test]
    fn min_grid_scans_ascending() {
        let s = space();
        assert_eq!(s.min_grid_at_least(0.0), Some(0.0));
        assert_eq!(s.min_grid_at_least(62.0), Some(100.0));
        assert_eq!(s.min_grid_at_least(100.0), Some(100.0));
        assert_eq!(s.min_grid_at_least(150.1), None);
    }

    #[test]
    fn snap_moves_up_then_caps() {
        let s = space();
        assert_eq!(s.snap_pv(10), 10);
        assert_eq!(s.snap_pv(11), 20);
        assert_eq!(s.snap_pv(999), 50);
        assert_eq!(s.snap_wt(1), 5);
    }
}
