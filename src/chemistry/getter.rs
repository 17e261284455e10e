//! Abundance resolution: equilibrium grid queries and custom tables
//!
//! Two mutually exclusive sources of per-layer composition:
//!
//! - [`AbundanceGetter::get`]: interpolate the equilibrium [`ChemistryGrid`]
//!   at a (Z, C/O, T, P) point.
//! - [`AbundanceGetter::from_file`]: load a user-supplied table of mixing
//!   fractions against (T, P). The file format is compatible with legacy
//!   ExoTransmit-style tables; the `CH2O` column is renamed to `H2CO` on
//!   import.
//!
//! The facade picks exactly one source per forward-model call.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use ndarray::Array2;

use crate::chemistry::grid::{Abundances, ChemistryGrid};
use crate::chemistry::species::Species;
use crate::error::{ForwardModelError, Result};

// =================================================================================================
// Equilibrium getter
// =================================================================================================

/// Read-only handle over the shared equilibrium grid
///
/// Cheap to clone; all clones share the same immutable grid. Queries are
/// pure functions with no side effects.
#[derive(Debug, Clone)]
pub struct AbundanceGetter {
    grid: Arc<ChemistryGrid>,
}

impl AbundanceGetter {
    /// Wrap a shared chemistry grid
    pub fn new(grid: Arc<ChemistryGrid>) -> Self {
        Self { grid }
    }

    /// Equilibrium mixing fractions at one (Z, C/O, T, P) point
    ///
    /// # Errors
    ///
    /// `Range` when any query value is outside the tabulated axes; the
    /// failure is immediate and nothing is clamped.
    pub fn get(
        &self,
        log_metallicity: f64,
        co_ratio: f64,
        temperature: f64,
        pressure: f64,
    ) -> Result<Abundances> {
        self.grid
            .interpolate(log_metallicity, co_ratio, temperature, pressure)
    }

    /// The underlying grid, for bounds introspection
    pub fn grid(&self) -> &ChemistryGrid {
        &self.grid
    }

    /// Load a custom abundance table from a whitespace-separated text file
    ///
    /// Expected layout: a header line `T P <species...>` followed by one row
    /// per (T, P) grid point, T-major. Species columns are matched by name;
    /// the legacy name `CH2O` is accepted for `H2CO`. Unrecognized columns
    /// are skipped with a warning rather than failing, so tables carrying
    /// condensates or ions degrade gracefully.
    pub fn from_file(path: impl AsRef<Path>) -> Result<CustomAbundanceTable> {
        let text = std::fs::read_to_string(path.as_ref())?;
        CustomAbundanceTable::parse(&text)
    }
}

// =================================================================================================
// Custom abundance table
// =================================================================================================

/// User-supplied mixing fractions tabulated over (T, P)
///
/// Evaluation clamps to the table edges: unlike the equilibrium grid, a
/// custom table is the user's own statement of composition and carries no
/// physical-validity bound beyond its own extent.
#[derive(Debug, Clone)]
pub struct CustomAbundanceTable {
    /// Temperature axis \[K\], strictly increasing
    t_axis: Vec<f64>,
    /// Pressure axis \[Pa\], strictly increasing
    p_axis: Vec<f64>,
    /// Per-species fraction surfaces, shape (T, P)
    fractions: HashMap<Species, Array2<f64>>,
}

impl CustomAbundanceTable {
    /// Parse the text form of a table; see [`AbundanceGetter::from_file`]
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'));

        let header = lines
            .next()
            .ok_or_else(|| ForwardModelError::Data("empty abundance table".into()))?;
        let columns: Vec<&str> = header.split_whitespace().collect();
        if columns.len() < 3 || columns[0] != "T" || columns[1] != "P" {
            return Err(ForwardModelError::Data(
                "abundance table header must start with 'T P'".to_string(),
            ));
        }

        // Map column index -> species, warning once per unknown column
        let mut column_species: Vec<Option<Species>> = Vec::new();
        for name in &columns[2..] {
            let species = Species::from_name(name);
            if species.is_none() {
                log::warn!("ignoring unknown species column '{}' in abundance table", name);
            }
            column_species.push(species);
        }

        let mut temperatures = Vec::new();
        let mut pressures = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        for line in lines {
            let values: Vec<f64> = line
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<f64>().map_err(|_| {
                        ForwardModelError::Data(format!("bad number '{}' in abundance table", tok))
                    })
                })
                .collect::<Result<_>>()?;
            if values.len() != columns.len() {
                return Err(ForwardModelError::Data(format!(
                    "row has {} fields, header has {}",
                    values.len(),
                    columns.len()
                )));
            }
            temperatures.push(values[0]);
            pressures.push(values[1]);
            rows.push(values[2..].to_vec());
        }

        let t_axis = unique_sorted(&temperatures);
        let p_axis = unique_sorted(&pressures);
        if t_axis.len() < 2 || p_axis.len() < 2 {
            return Err(ForwardModelError::Data(
                "abundance table needs at least a 2x2 (T, P) grid".to_string(),
            ));
        }
        if rows.len() != t_axis.len() * p_axis.len() {
            return Err(ForwardModelError::Data(format!(
                "table has {} rows, expected {} for a {}x{} (T, P) grid",
                rows.len(),
                t_axis.len() * p_axis.len(),
                t_axis.len(),
                p_axis.len()
            )));
        }

        let mut fractions: HashMap<Species, Array2<f64>> = HashMap::new();
        for (col, species) in column_species.iter().enumerate() {
            let Some(species) = species else { continue };
            let mut surface = Array2::zeros((t_axis.len(), p_axis.len()));
            for (row_idx, row) in rows.iter().enumerate() {
                let it = axis_position(&t_axis, temperatures[row_idx])?;
                let ip = axis_position(&p_axis, pressures[row_idx])?;
                surface[[it, ip]] = row[col];
            }
            fractions.insert(*species, surface);
        }

        Ok(Self {
            t_axis,
            p_axis,
            fractions,
        })
    }

    /// Species carried by this table
    pub fn species(&self) -> impl Iterator<Item = Species> + '_ {
        self.fractions.keys().copied()
    }

    /// Bilinear sample at (T, P), clamped to the table edges
    ///
    /// Pressure is interpolated on a log10 axis, matching the equilibrium
    /// grid convention.
    pub fn sample(&self, temperature: f64, pressure: f64) -> Abundances {
        let (it, wt) = clamped_bracket(&self.t_axis, temperature);
        let log_p: Vec<f64> = self.p_axis.iter().map(|p| p.log10()).collect();
        let (ip, wp) = clamped_bracket(&log_p, pressure.log10());

        let mut result = Abundances::zeros();
        for (species, surface) in &self.fractions {
            let f = (1.0 - wt) * (1.0 - wp) * surface[[it, ip]]
                + (1.0 - wt) * wp * surface[[it, ip + 1]]
                + wt * (1.0 - wp) * surface[[it + 1, ip]]
                + wt * wp * surface[[it + 1, ip + 1]];
            result.set(*species, f);
        }
        result
    }
}

/// Sorted deduplicated copy of an axis sampled from table rows
fn unique_sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON * a.abs().max(1.0));
    sorted
}

/// Exact index of a value on a deduplicated axis
fn axis_position(axis: &[f64], value: f64) -> Result<usize> {
    axis.iter()
        .position(|x| (*x - value).abs() < f64::EPSILON * x.abs().max(1.0))
        .ok_or_else(|| ForwardModelError::Data("inconsistent (T, P) grid in table".to_string()))
}

/// Bracket with clamping: returns (lower index, upper-neighbor weight)
fn clamped_bracket(axis: &[f64], value: f64) -> (usize, f64) {
    if value <= axis[0] {
        return (0, 0.0);
    }
    if value >= axis[axis.len() - 1] {
        return (axis.len() - 2, 1.0);
    }
    let upper = axis.partition_point(|x| *x <= value).min(axis.len() - 1);
    let lower = upper - 1;
    let weight = (value - axis[lower]) / (axis[upper] - axis[lower]);
    (lower, weight)
}

// =================================================================================================
// Tests
// =================================================================================================
