//! Radiative transfer core
//!
//! This module turns a discretized atmosphere plus per-layer composition
//! into observable depths:
//!
//! 1. **Extinction assembly** (`optical_depth`): per-layer, per-wavelength
//!    extinction coefficients from gas absorption, collision-induced
//!    absorption, and a parametric scattering slope.
//! 2. **Line-of-sight integration** (`optical_depth`): a geometric path
//!    matrix contracted against the extinction matrix in a single dense
//!    matrix multiplication. This contraction is the performance-critical
//!    path of the whole crate; it deliberately goes through nalgebra's
//!    optimized dense kernels rather than hand-rolled nested loops.
//! 3. **Observables**: `transit` integrates transmission over the stellar
//!    annulus; `eclipse` integrates Planck-weighted emission through the
//!    vertical optical depth, with a pluggable execution backend.
//!
//! Every entry point is a pure function of immutable inputs; concurrent
//! calls share nothing mutable.

mod eclipse;
mod optical_depth;
mod transit;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// Deciding *when* to hand the emission integral to Rayon is an execution
// concern, not a physics concern, so the knob lives at the module root next
// to the backend selection.
//
// The threshold is an AtomicUsize so benchmarks and tests can change it at
// runtime without a mutex on every call. Relaxed ordering is sufficient:
// the value is a performance hint, not a synchronisation point.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default problem size (wavelengths x layers) above which
/// [`select_backend`] prefers the parallel emission backend.
const DEFAULT_PARALLEL_THRESHOLD: usize = 100_000;

static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Current parallel-dispatch threshold (wavelengths x layers)
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-dispatch threshold
///
/// # Panics
///
/// Panics when `threshold == 0`; a zero threshold would force parallel
/// dispatch on trivially small problems, which is never intended.
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// RAII guard saving the threshold on construction, restoring it on drop.
///
/// Test-only; prevents one test from leaking a modified threshold.
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    pub(crate) fn save(new_value: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use eclipse::{
    compute_eclipse_depths, planck, select_backend, EmissionBackend, ReferenceBackend,
};
#[cfg(feature = "parallel")]
pub use eclipse::ParallelBackend;

pub use optical_depth::{extinction_matrix, OpticalDepthField, ScatteringParams};
pub use transit::{compute_transit_depths, CloudDeck, Spectrum};

// =================================================================================================
// Tests
// =================================================================================================
