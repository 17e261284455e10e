//! Opacity data-directory loader
//!
//! Layout of a data directory:
//!
//! ```text
//! data/
//!   wavelengths.dat        one wavelength [m] per line
//!   temperatures.dat       one temperature [K] per line
//!   pressures.dat          one pressure [Pa] per line
//!   sigma_H2O.dat          flat cross-sections [m²], wavelength-major
//!   sigma_CH4.dat          (T inner-major, P innermost)
//!   ...
//!   cia_H2_H2.dat          flat CIA [m⁵], wavelength-major, T innermost
//!   cia_H2_He.dat
//! ```
//!
//! # Missing species files
//!
//! Deleting `sigma_<SPECIES>.dat` is a supported performance knob: the
//! species then contributes zero opacity and a warning is logged. Set
//! [`OpacityConfig::missing_species_is_error`] to treat absence as a hard
//! failure instead.

use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3};

use crate::chemistry::Species;
use crate::error::{ForwardModelError, Result};
use crate::opacity::store::OpacityStore;

// =================================================================================================
// Configuration
// =================================================================================================

/// Loader configuration
#[derive(Debug, Clone)]
pub struct OpacityConfig {
    /// Directory holding the grid and table files
    pub data_dir: PathBuf,
    /// When true, a missing `sigma_*.dat` file aborts the load instead of
    /// zeroing that species' opacity
    pub missing_species_is_error: bool,
}

impl OpacityConfig {
    /// Default configuration for a data directory: missing files are a
    /// logged degradation, not an error
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            missing_species_is_error: false,
        }
    }
}

// =================================================================================================
// Loading
// =================================================================================================

/// Load an [`OpacityStore`] from a data directory
pub fn load_store(config: &OpacityConfig) -> Result<OpacityStore> {
    let dir = &config.data_dir;
    let wavelengths = read_column(&dir.join("wavelengths.dat"))?;
    let t_grid = read_column(&dir.join("temperatures.dat"))?;
    let p_grid = read_column(&dir.join("pressures.dat"))?;

    let (n_l, n_t, n_p) = (wavelengths.len(), t_grid.len(), p_grid.len());
    let mut store = OpacityStore::new(wavelengths, t_grid, p_grid)?;

    for species in Species::ALL {
        let path = dir.join(format!("sigma_{}.dat", species.name()));
        if !path.exists() {
            if config.missing_species_is_error {
                return Err(ForwardModelError::Data(format!(
                    "missing cross-section file {}",
                    path.display()
                )));
            }
            log::warn!(
                "no cross-section file for {}; species will not absorb",
                species
            );
            continue;
        }
        let flat = read_column(&path)?;
        if flat.len() != n_l * n_t * n_p {
            return Err(ForwardModelError::Data(format!(
                "{} has {} values, expected {}",
                path.display(),
                flat.len(),
                n_l * n_t * n_p
            )));
        }
        let sigma = Array3::from_shape_vec((n_l, n_t, n_p), flat)
            .map_err(|e| ForwardModelError::Data(e.to_string()))?;
        store.insert_species(species, sigma)?;
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(pair) = name
            .strip_prefix("cia_")
            .and_then(|rest| rest.strip_suffix(".dat"))
        else {
            continue;
        };
        let Some((first, second)) = pair.split_once('_') else {
            log::warn!("ignoring malformed CIA file name {}", name);
            continue;
        };
        let (Some(s1), Some(s2)) = (Species::from_name(first), Species::from_name(second))
        else {
            log::warn!("ignoring CIA file with unknown species: {}", name);
            continue;
        };
        let flat = read_column(&path)?;
        if flat.len() != n_l * n_t {
            return Err(ForwardModelError::Data(format!(
                "{} has {} values, expected {}",
                path.display(),
                flat.len(),
                n_l * n_t
            )));
        }
        let k = Array2::from_shape_vec((n_l, n_t), flat)
            .map_err(|e| ForwardModelError::Data(e.to_string()))?;
        store.insert_collisional(s1, s2, k)?;
    }

    Ok(store)
}

/// Read a whitespace/newline-separated column of floats
fn read_column(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)?;
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| {
                ForwardModelError::Data(format!("bad number '{}' in {}", tok, path.display()))
            })
        })
        .collect()
}

// =================================================================================================
// Tests
// =================================================================================================
