//! Precomputed equilibrium-chemistry grid
//!
//! The grid tabulates equilibrium mixing fractions for all supported species
//! over four axes:
//!
//! - log10 metallicity, relative to solar: \[-1, 3\] (0.1x to 1000x solar)
//! - C/O ratio: \[0.05, 2\]
//! - temperature: \[300, 3000\] K
//! - pressure: \[1e-4, 1e8\] Pa
//!
//! Storage is a dense 5-D array (species x Z x C/O x T x P) rather than
//! nested maps: fixed-shape indexed arrays make range checking exact and
//! keep the 16-corner interpolation cache-friendly.
//!
//! # Interpolation order
//!
//! Queries are answered by multilinear interpolation of the mixing fraction
//! over (log10 Z, C/O, T, log10 P). Linear order was chosen over splines: it
//! is monotone between grid points, which the regression bounds rely on.
//!
//! # Range policy
//!
//! A query outside any tabulated axis fails hard with a `Range` error.
//! Extrapolated equilibrium chemistry is not physically meaningful, so no
//! clamping is ever performed.

use ndarray::{Array5, Axis};

use crate::chemistry::species::{Species, NUM_SPECIES};
use crate::error::{ForwardModelError, Result};

/// Slack allowed on the per-point fraction sum, absorbing file rounding
const SUM_TOLERANCE: f64 = 1e-6;

// =================================================================================================
// Abundance query result
// =================================================================================================

/// Mixing fractions for all species at one (Z, C/O, T, P) point
///
/// Dense fixed-size storage indexed by [`Species::index`]. Fractions are
/// dimensionless number fractions and sum to at most 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Abundances {
    fractions: [f64; NUM_SPECIES],
}

impl Abundances {
    /// Create from a dense fraction array in canonical species order
    pub fn new(fractions: [f64; NUM_SPECIES]) -> Self {
        Self { fractions }
    }

    /// All-zero abundances
    pub fn zeros() -> Self {
        Self {
            fractions: [0.0; NUM_SPECIES],
        }
    }

    /// Mixing fraction of one species
    #[inline]
    pub fn get(&self, species: Species) -> f64 {
        self.fractions[species.index()]
    }

    /// Overwrite the fraction of one species
    pub fn set(&mut self, species: Species, fraction: f64) {
        self.fractions[species.index()] = fraction;
    }

    /// Sum of all fractions
    pub fn total(&self) -> f64 {
        self.fractions.iter().sum()
    }

    /// Mean molecular weight \[amu\] implied by these fractions
    ///
    /// Fractions are renormalized by their total so that a truncated
    /// composition (sum < 1) still yields a sensible mean.
    pub fn mean_molecular_weight(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        let weighted: f64 = Species::ALL
            .iter()
            .map(|s| self.get(*s) * s.mass_amu())
            .sum();
        weighted / total
    }

    /// Iterate (species, fraction) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        Species::ALL
            .iter()
            .map(move |s| (*s, self.fractions[s.index()]))
    }
}

// =================================================================================================
// Axis bracketing
// =================================================================================================

/// Bracketing result on one sorted axis: lower index and linear weight
#[derive(Debug, Clone, Copy)]
struct Bracket {
    lower: usize,
    /// Weight of the *upper* neighbor, in \[0, 1\]
    weight: f64,
}

/// Locate `value` on a strictly increasing axis
///
/// Fails with a `Range` error when `value` lies outside the axis, including
/// NaN queries (every comparison against NaN is false, so NaN can never
/// bracket).
fn bracket(axis: &[f64], value: f64, quantity: &'static str) -> Result<Bracket> {
    let min = axis[0];
    let max = axis[axis.len() - 1];
    if !(value >= min && value <= max) {
        return Err(ForwardModelError::out_of_range(quantity, value, min, max));
    }

    // partition_point returns the first index with axis[i] > value
    let upper = axis.partition_point(|x| *x <= value).min(axis.len() - 1);
    let lower = upper.saturating_sub(1);
    let span = axis[upper] - axis[lower];
    let weight = if span > 0.0 {
        (value - axis[lower]) / span
    } else {
        0.0
    };
    Ok(Bracket { lower, weight })
}

// =================================================================================================
// Chemistry grid
// =================================================================================================

/// Dense equilibrium-abundance grid over (Z, C/O, T, P)
///
/// Immutable once constructed; intended to be loaded at process start and
/// shared read-only (`Arc`) across all forward-model invocations.
#[derive(Debug, Clone)]
pub struct ChemistryGrid {
    /// log10 metallicity axis, strictly increasing
    log_z: Vec<f64>,
    /// C/O ratio axis, strictly increasing
    co_ratio: Vec<f64>,
    /// Temperature axis \[K\], strictly increasing
    temperature: Vec<f64>,
    /// Pressure axis \[Pa\], strictly increasing
    pressure: Vec<f64>,
    /// log10 of the pressure axis, precomputed for interpolation
    log_p: Vec<f64>,
    /// Mixing fractions, shape (species, Z, C/O, T, P)
    fractions: Array5<f64>,
}

impl ChemistryGrid {
    /// Build a grid from its axes and the dense fraction array
    ///
    /// # Errors
    ///
    /// Fails with `Data` when the array shape does not match the axes, when
    /// any axis is not strictly increasing or shorter than 2 points, when
    /// any fraction is negative or non-finite, or when the fractions at any
    /// grid point sum to more than 1.
    pub fn new(
        log_z: Vec<f64>,
        co_ratio: Vec<f64>,
        temperature: Vec<f64>,
        pressure: Vec<f64>,
        fractions: Array5<f64>,
    ) -> Result<Self> {
        for (name, axis) in [
            ("logZ", &log_z),
            ("C/O ratio", &co_ratio),
            ("temperature", &temperature),
            ("pressure", &pressure),
        ] {
            if axis.len() < 2 {
                return Err(ForwardModelError::Data(format!(
                    "{} axis needs at least 2 points, got {}",
                    name,
                    axis.len()
                )));
            }
            if axis.windows(2).any(|w| w[1] <= w[0]) {
                return Err(ForwardModelError::Data(format!(
                    "{} axis must be strictly increasing",
                    name
                )));
            }
        }

        let expected = [
            NUM_SPECIES,
            log_z.len(),
            co_ratio.len(),
            temperature.len(),
            pressure.len(),
        ];
        if fractions.shape() != expected {
            return Err(ForwardModelError::Data(format!(
                "fraction array shape {:?} does not match axes {:?}",
                fractions.shape(),
                expected
            )));
        }

        if fractions.iter().any(|x| !x.is_finite() || *x < 0.0) {
            return Err(ForwardModelError::Data(
                "fractions must be finite and non-negative".to_string(),
            ));
        }

        // Number fractions of one gas mix: no grid point may exceed unity
        let totals = fractions.sum_axis(Axis(0));
        if let Some(total) = totals.iter().find(|t| **t > 1.0 + SUM_TOLERANCE) {
            return Err(ForwardModelError::Data(format!(
                "mixing fractions sum to {} at a grid point, must not exceed 1",
                total
            )));
        }

        let log_p = pressure.iter().map(|p| p.log10()).collect();
        Ok(Self {
            log_z,
            co_ratio,
            temperature,
            pressure,
            log_p,
            fractions,
        })
    }

    /// Tabulated (min, max) of the log10 metallicity axis
    pub fn log_z_bounds(&self) -> (f64, f64) {
        (self.log_z[0], self.log_z[self.log_z.len() - 1])
    }

    /// Tabulated (min, max) of the C/O axis
    pub fn co_bounds(&self) -> (f64, f64) {
        (self.co_ratio[0], self.co_ratio[self.co_ratio.len() - 1])
    }

    /// Tabulated (min, max) of the temperature axis \[K\]
    pub fn temperature_bounds(&self) -> (f64, f64) {
        (self.temperature[0], self.temperature[self.temperature.len() - 1])
    }

    /// Tabulated (min, max) of the pressure axis \[Pa\]
    pub fn pressure_bounds(&self) -> (f64, f64) {
        (self.pressure[0], self.pressure[self.pressure.len() - 1])
    }

    /// Interpolate mixing fractions at one (Z, C/O, T, P) point
    ///
    /// `metallicity` is given as log10 relative to solar. Pressure is
    /// interpolated on a log10 axis; the range check applies to the raw
    /// value in Pa.
    ///
    /// # Errors
    ///
    /// `Range` when any of the four query values lies outside the tabulated
    /// axes. Never clamps.
    pub fn interpolate(
        &self,
        log_metallicity: f64,
        co_ratio: f64,
        temperature: f64,
        pressure: f64,
    ) -> Result<Abundances> {
        let bz = bracket(&self.log_z, log_metallicity, "logZ")?;
        let bc = bracket(&self.co_ratio, co_ratio, "C/O ratio")?;
        let bt = bracket(&self.temperature, temperature, "temperature")?;
        // Range check against the physical axis, weight from the log axis
        if !(pressure >= self.pressure[0]
            && pressure <= self.pressure[self.pressure.len() - 1])
        {
            return Err(ForwardModelError::out_of_range(
                "pressure",
                pressure,
                self.pressure[0],
                self.pressure[self.pressure.len() - 1],
            ));
        }
        let bp = bracket(&self.log_p, pressure.log10(), "pressure")?;

        let mut fractions = [0.0; NUM_SPECIES];
        // 16-corner multilinear blend per species
        for (s, fraction) in fractions.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (dz, wz) in [(0, 1.0 - bz.weight), (1, bz.weight)] {
                for (dc, wc) in [(0, 1.0 - bc.weight), (1, bc.weight)] {
                    for (dt, wt) in [(0, 1.0 - bt.weight), (1, bt.weight)] {
                        for (dp, wp) in [(0, 1.0 - bp.weight), (1, bp.weight)] {
                            let w = wz * wc * wt * wp;
                            if w == 0.0 {
                                continue;
                            }
                            acc += w
                                * self.fractions[[
                                    s,
                                    bz.lower + dz,
                                    bc.lower + dc,
                                    bt.lower + dt,
                                    bp.lower + dp,
                                ]];
                        }
                    }
                }
            }
            *fraction = acc;
        }

        Ok(Abundances::new(fractions))
    }

    /// Fraction at an exact grid index, mainly for diagnostics
    pub fn at(&self, species: Species, iz: usize, ic: usize, it: usize, ip: usize) -> f64 {
        self.fractions[[species.index(), iz, ic, it, ip]]
    }
}

// =================================================================================================
// Tests
// =================================================================================================
