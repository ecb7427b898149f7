//! Error types for the dispatch core.

use thiserror::Error;

/// Errors raised by the dispatch core.
///
/// Construction-time problems (action space, model parameters) and per-call
/// input validation share this type. Policy misses and infeasible demand are
/// not errors; they are reported through the dispatch result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("invalid state: {field} = {value} ({reason})")]
    InvalidState {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid action space: {dimension} levels {reason}")]
    InvalidActionSpace {
        dimension: &'static str,
        reason: &'static str,
    },

    #[error("invalid parameter: {field} {reason}")]
    InvalidParameter {
        field: &'static str,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Checks that a model parameter is finite and non-negative.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(DispatchError::InvalidParameter {
            field,
            reason: "must be finite",
        });
    }
    if value < 0.0 {
        return Err(DispatchError::InvalidParameter {
            field,
            reason: "must be >= 0",
        });
    }
    Ok(())
}

/// Checks that a model parameter is finite and strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    ensure_non_negative(field, value)?;
    if value == 0.0 {
        return Err(DispatchError::InvalidParameter {
            field,
            reason: "must be > 0",
        });
    }
    Ok(())
}
