//! Construction errors

use thiserror::Error;

use crate::assembler::AssemblyState;
use crate::kernel::KernelError;
use crate::reference::Axis;

/// Fatal errors raised while constructing a part
///
/// None of these are retried: construction is deterministic, so the same
/// input fails the same way. Undersized dimensions are not errors; they are
/// raised to their geometric minimum and reported through
/// [`Diagnostics`](crate::assembler::Diagnostics).
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// Caller-supplied axis frame is not orthonormal
    #[error("Axis frame is not orthogonal: {0}")]
    Orthogonality(String),

    /// Non-positive or otherwise nonsensical dimension
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// A reference code was read before being set
    #[error("Reference {code} on axis {axis} is undefined")]
    UndefinedReference { axis: Axis, code: i32 },

    /// Assembler method called out of sequence
    #[error("Cannot {operation} while assembler is {state}")]
    InvalidState {
        operation: &'static str,
        state: AssemblyState,
    },

    /// An edge selector matched no edge of the solid
    #[error("Edge selection failed: {0}")]
    EdgeSelection(String),

    #[error("Geometry kernel error: {0}")]
    Kernel(#[from] KernelError),
}

/// Result type for construction operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Fail with [`BuildError::InvalidDimension`] unless `value` is finite and positive
pub fn require_positive(what: &str, value: f64) -> BuildResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BuildError::InvalidDimension(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

/// Fail with [`BuildError::InvalidDimension`] unless `value` is finite and not negative
pub fn require_non_negative(what: &str, value: f64) -> BuildResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BuildError::InvalidDimension(format!(
            "{what} must not be negative, got {value}"
        )))
    }
}
