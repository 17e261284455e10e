//! In-memory opacity tables
//!
//! The [`OpacityStore`] holds per-species absorption cross-section surfaces
//! over (wavelength, temperature, pressure), plus collision-induced
//! absorption tables over (wavelength, temperature). It is immutable once
//! built and shared read-only across forward-model calls.
//!
//! # Interpolation
//!
//! Cross-sections span many orders of magnitude, so layer lookups
//! interpolate log10(sigma) bilinearly in (T, log10 P), with sigma floored
//! at [`MIN_CROSS_SECTION`] before taking the log. Layer temperatures and
//! pressures are clamped to the tabulated edges: upstream validation
//! (chemistry-grid bounds) already constrains them to the physical range,
//! and the opacity grids are built to cover that range.
//!
//! # Absent species
//!
//! A species with no table in the store simply absorbs nothing. This is a
//! supported accuracy/performance trade-off (drop a file, skip its physics),
//! not an error; see the loader for the corresponding configuration flag.

use std::collections::HashMap;

use nalgebra::DVector;
use ndarray::{Array2, Array3};

use crate::chemistry::Species;
use crate::error::{ForwardModelError, Result};

/// Floor applied to tabulated cross-sections before log-space interpolation
pub const MIN_CROSS_SECTION: f64 = 1e-99;

// =================================================================================================
// Opacity store
// =================================================================================================

/// Shared read-only absorption data for the radiative transfer core
#[derive(Debug, Clone)]
pub struct OpacityStore {
    /// Wavelength grid \[m\], strictly increasing
    wavelengths: Vec<f64>,
    /// Temperature grid \[K\], strictly increasing
    t_grid: Vec<f64>,
    /// Pressure grid \[Pa\], strictly increasing
    p_grid: Vec<f64>,
    /// log10 pressure grid, precomputed
    log_p_grid: Vec<f64>,
    /// Per-species log10 cross-sections, shape (wavelength, T, P), sigma in m²
    log_absorption: HashMap<Species, Array3<f64>>,
    /// Collision-induced absorption: (s1, s2, log10 k) with k in m⁵, shape (wavelength, T)
    collisional: Vec<(Species, Species, Array2<f64>)>,
}

impl OpacityStore {
    /// Create an empty store over the given grids
    ///
    /// # Errors
    ///
    /// `Data` when any grid is shorter than 2 points or not strictly
    /// increasing.
    pub fn new(wavelengths: Vec<f64>, t_grid: Vec<f64>, p_grid: Vec<f64>) -> Result<Self> {
        for (name, axis) in [
            ("wavelength", &wavelengths),
            ("temperature", &t_grid),
            ("pressure", &p_grid),
        ] {
            if axis.len() < 2 {
                return Err(ForwardModelError::Data(format!(
                    "opacity {} grid needs at least 2 points",
                    name
                )));
            }
            if axis.windows(2).any(|w| w[1] <= w[0]) {
                return Err(ForwardModelError::Data(format!(
                    "opacity {} grid must be strictly increasing",
                    name
                )));
            }
        }
        let log_p_grid = p_grid.iter().map(|p| p.log10()).collect();
        Ok(Self {
            wavelengths,
            t_grid,
            p_grid,
            log_p_grid,
            log_absorption: HashMap::new(),
            collisional: Vec::new(),
        })
    }

    /// Register a species cross-section surface, sigma in m²
    ///
    /// The array shape must be (wavelengths, T, P). Values are floored at
    /// [`MIN_CROSS_SECTION`] and stored as log10.
    pub fn insert_species(&mut self, species: Species, sigma: Array3<f64>) -> Result<()> {
        let expected = [self.wavelengths.len(), self.t_grid.len(), self.p_grid.len()];
        if sigma.shape() != expected {
            return Err(ForwardModelError::Data(format!(
                "cross-section array for {} has shape {:?}, expected {:?}",
                species,
                sigma.shape(),
                expected
            )));
        }
        if sigma.iter().any(|x| !x.is_finite() || *x < 0.0) {
            return Err(ForwardModelError::Data(format!(
                "cross-section array for {} must be finite and non-negative",
                species
            )));
        }
        let log_sigma = sigma.mapv(|x| x.max(MIN_CROSS_SECTION).log10());
        self.log_absorption.insert(species, log_sigma);
        Ok(())
    }

    /// Register a collision-induced absorption table, k in m⁵
    ///
    /// The array shape must be (wavelengths, T).
    pub fn insert_collisional(
        &mut self,
        s1: Species,
        s2: Species,
        k: Array2<f64>,
    ) -> Result<()> {
        let expected = [self.wavelengths.len(), self.t_grid.len()];
        if k.shape() != expected {
            return Err(ForwardModelError::Data(format!(
                "CIA array for {}-{} has shape {:?}, expected {:?}",
                s1,
                s2,
                k.shape(),
                expected
            )));
        }
        let log_k = k.mapv(|x| x.max(MIN_CROSS_SECTION).log10());
        self.collisional.push((s1, s2, log_k));
        Ok(())
    }

    /// Wavelength grid \[m\]
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Number of wavelength bins
    pub fn n_wavelengths(&self) -> usize {
        self.wavelengths.len()
    }

    /// Whether a species has an absorption table
    pub fn has_species(&self, species: Species) -> bool {
        self.log_absorption.contains_key(&species)
    }

    /// Species with absorption tables, in arbitrary order
    pub fn absorbing_species(&self) -> impl Iterator<Item = Species> + '_ {
        self.log_absorption.keys().copied()
    }

    /// Registered collisional pairs
    pub fn collisional_pairs(&self) -> impl Iterator<Item = (Species, Species)> + '_ {
        self.collisional.iter().map(|(a, b, _)| (*a, *b))
    }

    /// Cross-section spectrum of one species at a layer's (T, P)
    ///
    /// Returns sigma(lambda) in m² for every wavelength bin, or `None` when
    /// the species has no table (it then absorbs nothing).
    pub fn cross_section_row(
        &self,
        species: Species,
        temperature: f64,
        pressure: f64,
    ) -> Option<DVector<f64>> {
        let log_sigma = self.log_absorption.get(&species)?;
        let (it, wt) = clamped_bracket(&self.t_grid, temperature);
        let (ip, wp) = clamped_bracket(&self.log_p_grid, pressure.log10());

        let n = self.wavelengths.len();
        let mut row = DVector::zeros(n);
        for l in 0..n {
            let blended = (1.0 - wt) * (1.0 - wp) * log_sigma[[l, it, ip]]
                + (1.0 - wt) * wp * log_sigma[[l, it, ip + 1]]
                + wt * (1.0 - wp) * log_sigma[[l, it + 1, ip]]
                + wt * wp * log_sigma[[l, it + 1, ip + 1]];
            row[l] = 10f64.powf(blended);
        }
        Some(row)
    }

    /// Collision-induced absorption rows at a layer temperature
    ///
    /// Yields (s1, s2, k(lambda)) with k in m⁵, interpolated linearly in T
    /// on the log10 table.
    pub fn collisional_rows(
        &self,
        temperature: f64,
    ) -> impl Iterator<Item = (Species, Species, DVector<f64>)> + '_ {
        let (it, wt) = clamped_bracket(&self.t_grid, temperature);
        self.collisional.iter().map(move |(s1, s2, log_k)| {
            let n = self.wavelengths.len();
            let mut row = DVector::zeros(n);
            for l in 0..n {
                let blended = (1.0 - wt) * log_k[[l, it]] + wt * log_k[[l, it + 1]];
                row[l] = 10f64.powf(blended);
            }
            (*s1, *s2, row)
        })
    }
}

/// Bracket with clamping on a strictly increasing axis
fn clamped_bracket(axis: &[f64], value: f64) -> (usize, f64) {
    if value <= axis[0] {
        return (0, 0.0);
    }
    if value >= axis[axis.len() - 1] {
        return (axis.len() - 2, 1.0);
    }
    let upper = axis.partition_point(|x| *x <= value).min(axis.len() - 1);
    let lower = upper - 1;
    ((lower), (value - axis[lower]) / (axis[upper] - axis[lower]))
}

// =================================================================================================
// Tests
// =================================================================================================
