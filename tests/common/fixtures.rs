//! Synthetic tables for integration tests
//!
//! Real opacity and chemistry tables are hundreds of megabytes; the tests
//! use small synthetic stand-ins with known analytic structure so expected
//! values can be derived by hand.

use std::sync::Arc;

use ndarray::{Array2, Array3, Array5};
use transit_rs::chemistry::{ChemistryGrid, Species, NUM_SPECIES};
use transit_rs::constants::{M_JUP, R_JUP, R_SUN, TEFF_SUN};
use transit_rs::forward::SystemParams;
use transit_rs::opacity::OpacityStore;

/// Wavelength grid shared by all synthetic opacity tables \[m\]
pub fn test_wavelengths() -> Vec<f64> {
    (0..20).map(|i| 1.0e-6 + i as f64 * 0.2e-6).collect()
}

/// Opacity store with flat H2O absorption and weak CH4 absorption
///
/// Cross sections are constant over (T, P) so interpolation effects cancel
/// and depth changes trace abundance changes alone.
pub fn synthetic_opacities(h2o_sigma: f64, ch4_sigma: f64) -> Arc<OpacityStore> {
    let wavelengths = test_wavelengths();
    let n = wavelengths.len();
    let mut store =
        OpacityStore::new(wavelengths, vec![300.0, 3000.0], vec![1e-4, 1e8]).unwrap();
    store
        .insert_species(Species::H2O, Array3::from_elem((n, 2, 2), h2o_sigma))
        .unwrap();
    store
        .insert_species(Species::CH4, Array3::from_elem((n, 2, 2), ch4_sigma))
        .unwrap();
    Arc::new(store)
}

/// Synthetic opacity store with an H2-H2 collisional pair added
pub fn synthetic_opacities_with_cia(h2o_sigma: f64, cia_k: f64) -> Arc<OpacityStore> {
    let wavelengths = test_wavelengths();
    let n = wavelengths.len();
    let mut store =
        OpacityStore::new(wavelengths, vec![300.0, 3000.0], vec![1e-4, 1e8]).unwrap();
    store
        .insert_species(Species::H2O, Array3::from_elem((n, 2, 2), h2o_sigma))
        .unwrap();
    store
        .insert_collisional(Species::H2, Species::H2, Array2::from_elem((n, 2), cia_k))
        .unwrap();
    Arc::new(store)
}

/// Chemistry grid with solar-like structure: mostly H2/He, metallicity-scaled
/// H2O, and a CH4 fraction that falls with temperature
pub fn synthetic_chemistry() -> Arc<ChemistryGrid> {
    let log_z = vec![-1.0, 0.0, 1.0, 2.0, 3.0];
    let co = vec![0.05, 0.5, 1.0, 2.0];
    let t = vec![300.0, 1200.0, 2100.0, 3000.0];
    let p = vec![1e-4, 1e0, 1e4, 1e8];

    let mut fractions = Array5::zeros((NUM_SPECIES, 5, 4, 4, 4));
    for iz in 0..5 {
        for ic in 0..4 {
            for it in 0..4 {
                for ip in 0..4 {
                    // H2O scales with metallicity, CH4 dies off when hot
                    let h2o = 5e-4 * 10f64.powf(log_z[iz] - 2.0).min(1.0) + 1e-5;
                    let ch4 = 1e-5 * (1.0 - it as f64 / 3.0);
                    let he = 0.157;
                    let h2 = 1.0 - h2o - ch4 - he;
                    fractions[[Species::H2.index(), iz, ic, it, ip]] = h2;
                    fractions[[Species::He.index(), iz, ic, it, ip]] = he;
                    fractions[[Species::H2O.index(), iz, ic, it, ip]] = h2o;
                    fractions[[Species::CH4.index(), iz, ic, it, ip]] = ch4;
                }
            }
        }
    }
    Arc::new(ChemistryGrid::new(log_z, co, t, p, fractions).unwrap())
}

/// Canonical hot-Jupiter system: Jupiter analog around a Sun-like star
pub fn hot_jupiter_system() -> SystemParams {
    SystemParams {
        star_radius: R_SUN,
        star_temperature: TEFF_SUN,
        planet_mass: M_JUP,
        planet_radius: R_JUP,
    }
}
