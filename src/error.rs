//! Error taxonomy for the forward model
//!
//! Two fatal kinds and one non-fatal kind:
//!
//! - [`ForwardModelError::Range`]: a chemistry-grid query fell outside the
//!   tabulated bounds. Extrapolated equilibrium chemistry is not physically
//!   meaningful, so this is always a hard failure, never a silent clamp.
//! - [`ForwardModelError::Validation`]: malformed or contradictory inputs
//!   (mixed parametric/custom composition, mismatched array lengths,
//!   non-monotonic pressure profiles).
//! - Degraded configurations (missing opacity file, coarse resolution) are
//!   *not* errors: the affected term is zeroed and a `log::warn!` is issued.
//!
//! All errors are raised at the point of violation. A forward-model call
//! either returns a complete spectrum or fails entirely.

use thiserror::Error;

/// Errors produced by the forward model and its components
#[derive(Debug, Error)]
pub enum ForwardModelError {
    /// A chemistry-grid query outside the tabulated parameter bounds
    #[error("{quantity} = {value} is out of bounds ({min} to {max})")]
    Range {
        /// Name of the offending axis (e.g. "logZ", "C/O ratio")
        quantity: &'static str,
        /// Queried value
        value: f64,
        /// Lower tabulated bound
        min: f64,
        /// Upper tabulated bound
        max: f64,
    },

    /// Malformed or contradictory user inputs
    #[error("invalid input: {0}")]
    Validation(String),

    /// Malformed opacity or chemistry data file
    #[error("invalid data file: {0}")]
    Data(String),

    /// I/O failure while reading a data directory
    #[error("data I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ForwardModelError>;

impl ForwardModelError {
    /// Build a [`ForwardModelError::Range`] after a bounds check
    pub(crate) fn out_of_range(
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Self {
        Self::Range {
            quantity,
            value,
            min,
            max,
        }
    }

    /// Build a [`ForwardModelError::Validation`] from anything displayable
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
