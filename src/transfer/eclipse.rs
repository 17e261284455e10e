//! Eclipse-depth (secondary eclipse) computation
//!
//! In eclipse mode the transmission integral of transit mode is replaced by
//! a Planck-weighted emission integral at the same optical-depth field.
//! Walking each wavelength column from the top of the atmosphere downward,
//! every shell emits B(λ, T_shell) attenuated by the vertical optical depth
//! above it, and the deep atmosphere closes the column as an opaque
//! blackbody floor:
//!
//! ```text
//! I(λ) = Σ_j B(λ,T_j)·e^(−τ_above,j)·(1 − e^(−Δτ_j))  +  B(λ,T_base)·e^(−τ_total)
//! depth(λ) = I(λ) / B(λ, T_star) · (r_base/R_s)²
//! ```
//!
//! # Execution backends
//!
//! The emission integral is a dense (shells × wavelengths) reduction and is
//! the natural place for an accelerated execution substrate. The algorithm
//! is fixed; only the substrate varies:
//!
//! - [`ReferenceBackend`]: sequential, always available
//! - [`ParallelBackend`]: rayon work-stealing over wavelength columns,
//!   compiled with the `parallel` feature
//!
//! Both backends are required to agree within floating-point tolerance;
//! [`select_backend`] picks by availability and problem size, never by
//! algorithm.

use nalgebra::{DMatrix, DVector};

use crate::atmosphere::AtmosphereProfile;
use crate::chemistry::Abundances;
use crate::constants::{C_LIGHT, H_PLANCK, K_B};
use crate::error::{ForwardModelError, Result};
use crate::opacity::OpacityStore;
use crate::transfer::optical_depth::{extinction_matrix, OpticalDepthField, ScatteringParams};
use crate::transfer::transit::{above_cloud, CloudDeck, Spectrum};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// =================================================================================================
// Planck function
// =================================================================================================

/// Spectral radiance of a blackbody, B(λ, T) \[W·sr⁻¹·m⁻³\]
pub fn planck(wavelength: f64, temperature: f64) -> f64 {
    let x = H_PLANCK * C_LIGHT / (wavelength * K_B * temperature);
    2.0 * H_PLANCK * C_LIGHT * C_LIGHT / wavelength.powi(5) / (x.exp() - 1.0)
}

// =================================================================================================
// Emission backend strategy
// =================================================================================================

/// Execution substrate for the Planck-weighted emission integral
///
/// Implementations MUST compute the same quantity; they differ only in how
/// the per-wavelength columns are scheduled.
pub trait EmissionBackend: Send + Sync {
    /// Emergent intensity per wavelength bin
    ///
    /// `d_tau` has shape (shells × wavelengths), deep-first;
    /// `shell_temperatures` is aligned with its rows; `base_temperature`
    /// closes the column as an opaque floor.
    fn integrate_emission(
        &self,
        d_tau: &DMatrix<f64>,
        shell_temperatures: &[f64],
        base_temperature: f64,
        wavelengths: &[f64],
    ) -> DVector<f64>;

    /// Backend name, for diagnostics
    fn name(&self) -> &'static str;
}

/// One wavelength column of the emission integral, top-down
fn emission_column(
    d_tau: &DMatrix<f64>,
    shell_temperatures: &[f64],
    base_temperature: f64,
    wavelength: f64,
    column: usize,
) -> f64 {
    let n_shells = shell_temperatures.len();
    let mut tau_above = 0.0f64;
    let mut intensity = 0.0;
    for j in (0..n_shells).rev() {
        let dt = d_tau[(j, column)];
        intensity +=
            planck(wavelength, shell_temperatures[j]) * (-tau_above).exp() * (1.0 - (-dt).exp());
        tau_above += dt;
    }
    intensity + planck(wavelength, base_temperature) * (-tau_above).exp()
}

/// Sequential reference implementation, always available
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBackend;

impl EmissionBackend for ReferenceBackend {
    fn integrate_emission(
        &self,
        d_tau: &DMatrix<f64>,
        shell_temperatures: &[f64],
        base_temperature: f64,
        wavelengths: &[f64],
    ) -> DVector<f64> {
        DVector::from_iterator(
            wavelengths.len(),
            wavelengths.iter().enumerate().map(|(l, wavelength)| {
                emission_column(d_tau, shell_temperatures, base_temperature, *wavelength, l)
            }),
        )
    }

    fn name(&self) -> &'static str {
        "reference"
    }
}

/// Rayon-parallel implementation; same math, work-stealing over columns
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBackend;

#[cfg(feature = "parallel")]
impl EmissionBackend for ParallelBackend {
    fn integrate_emission(
        &self,
        d_tau: &DMatrix<f64>,
        shell_temperatures: &[f64],
        base_temperature: f64,
        wavelengths: &[f64],
    ) -> DVector<f64> {
        let intensities: Vec<f64> = wavelengths
            .par_iter()
            .enumerate()
            .map(|(l, wavelength)| {
                emission_column(d_tau, shell_temperatures, base_temperature, *wavelength, l)
            })
            .collect();
        DVector::from_vec(intensities)
    }

    fn name(&self) -> &'static str {
        "parallel"
    }
}

/// Pick a backend by availability and problem size
///
/// `problem_size` is the element count of the emission field (shells ×
/// wavelengths). The accelerated backend is selected only when compiled in
/// and the problem clears [`crate::transfer::parallel_threshold`].
pub fn select_backend(problem_size: usize) -> Box<dyn EmissionBackend> {
    #[cfg(feature = "parallel")]
    {
        if problem_size >= crate::transfer::parallel_threshold() {
            return Box::new(ParallelBackend);
        }
    }
    let _ = problem_size;
    Box::new(ReferenceBackend)
}

// =================================================================================================
// Eclipse depths
// =================================================================================================

/// Compute the eclipse-depth spectrum for one atmosphere
///
/// `backend` overrides the automatic selection; pass `None` to let
/// [`select_backend`] decide from the problem size. As in transit mode,
/// `scattering` falls back to Rayleigh defaults when unspecified.
///
/// # Errors
///
/// `Validation` for non-positive star radius/temperature, misaligned
/// abundances, or a cloud deck outside the atmosphere's pressure range.
#[allow(clippy::too_many_arguments)]
pub fn compute_eclipse_depths(
    star_radius: f64,
    star_temperature: f64,
    atmosphere: &AtmosphereProfile,
    abundances: &[Abundances],
    opacities: &OpacityStore,
    cloud: Option<&CloudDeck>,
    scattering: Option<&ScatteringParams>,
    backend: Option<&dyn EmissionBackend>,
) -> Result<Spectrum> {
    if !star_radius.is_finite() || star_radius <= 0.0 {
        return Err(ForwardModelError::validation(format!(
            "star radius must be positive, got {}",
            star_radius
        )));
    }
    if !star_temperature.is_finite() || star_temperature <= 0.0 {
        return Err(ForwardModelError::validation(format!(
            "star temperature must be positive, got {}",
            star_temperature
        )));
    }

    let (layers, layer_abundances) = above_cloud(atmosphere, abundances, cloud)?;
    let wavelengths = opacities.wavelengths().to_vec();

    // Fully opaque: the planet radiates as a blackbody at the deck
    if layers.len() < 2 {
        let t_deck = atmosphere.layers()[atmosphere.n_layers() - 1].temperature;
        let area = (atmosphere.top_radius() / star_radius).powi(2);
        let depths = wavelengths
            .iter()
            .map(|w| planck(*w, t_deck) / planck(*w, star_temperature) * area)
            .collect();
        return Spectrum::new(wavelengths, depths);
    }

    let scattering = scattering.copied().unwrap_or_default();
    let extinction = extinction_matrix(&layers, &layer_abundances, opacities, &scattering)?;
    let field = OpticalDepthField::from_extinction(&extinction, &layers)?;

    let selected;
    let backend = match backend {
        Some(b) => b,
        None => {
            selected = select_backend(field.d_tau_vertical().len());
            selected.as_ref()
        }
    };
    log::debug!("eclipse emission backend: {}", backend.name());

    let intensity = backend.integrate_emission(
        field.d_tau_vertical(),
        field.shell_temperatures(),
        layers[0].temperature,
        &wavelengths,
    );

    let area = (layers[0].radius / star_radius).powi(2);
    let depths: Vec<f64> = wavelengths
        .iter()
        .zip(intensity.iter())
        .map(|(w, i)| i / planck(*w, star_temperature) * area)
        .collect();

    Spectrum::new(wavelengths, depths)
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::{AtmosphereBuilder, TemperatureProfile};
    use crate::chemistry::Species;
    use crate::constants::{M_JUP, R_JUP, R_SUN, TEFF_SUN};
    use ndarray::Array3;

    fn store(sigma: f64) -> OpacityStore {
        let mut store = OpacityStore::new(
            vec![1.0e-6, 2.0e-6],
            vec![300.0, 3000.0],
            vec![1e-4, 1e8],
        )
        .unwrap();
        store
            .insert_species(Species::H2O, Array3::from_elem((2, 2, 2), sigma))
            .unwrap();
        store
    }

    fn atmosphere(t: f64) -> AtmosphereProfile {
        AtmosphereBuilder::new()
            .with_profile_heights(80)
            .build(M_JUP, R_JUP, &TemperatureProfile::Isothermal(t), |_, _| 2.3)
            .unwrap()
    }

    fn abundances(n: usize, h2o: f64) -> Vec<Abundances> {
        let mut ab = Abundances::zeros();
        ab.set(Species::H2, 1.0 - h2o);
        ab.set(Species::H2O, h2o);
        vec![ab; n]
    }

    #[test]
    fn test_planck_peak_shifts_with_temperature() {
        // Wien: hotter blackbodies are brighter at every wavelength
        assert!(planck(1e-6, 2000.0) > planck(1e-6, 1000.0));
        assert!(planck(1e-6, 1000.0) > 0.0);
    }

    #[test]
    fn test_isothermal_atmosphere_emits_like_blackbody() {
        // With every layer at the same temperature the emission integral
        // telescopes to B(λ, T) regardless of opacity structure.
        let atm = atmosphere(1500.0);
        let ab = abundances(atm.n_layers(), 1e-3);
        let spectrum = compute_eclipse_depths(
            R_SUN,
            TEFF_SUN,
            &atm,
            &ab,
            &store(1e-27),
            None,
            None,
            None,
        )
        .unwrap();

        for (w, depth) in spectrum.iter() {
            let expected =
                planck(w, 1500.0) / planck(w, TEFF_SUN) * (R_JUP / R_SUN).powi(2);
            // Base radius vs. bare radius differ slightly; loose tolerance
            assert!((depth - expected).abs() / expected < 0.05, "{} vs {}", depth, expected);
        }
    }

    #[test]
    fn test_backends_agree_within_tolerance() {
        let atm = atmosphere(1400.0);
        let ab = abundances(atm.n_layers(), 1e-3);
        let opacities = store(1e-27);

        let reference = compute_eclipse_depths(
            R_SUN,
            TEFF_SUN,
            &atm,
            &ab,
            &opacities,
            None,
            None,
            Some(&ReferenceBackend),
        )
        .unwrap();

        #[cfg(feature = "parallel")]
        {
            let parallel = compute_eclipse_depths(
                R_SUN,
                TEFF_SUN,
                &atm,
                &ab,
                &opacities,
                None,
                None,
                Some(&ParallelBackend),
            )
            .unwrap();
            for (a, b) in reference.depths().iter().zip(parallel.depths()) {
                assert!((a - b).abs() <= 1e-10 * a.abs().max(1e-30));
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            assert_eq!(reference.len(), 2);
        }
    }

    #[test]
    fn test_backend_selection_respects_threshold() {
        let _guard = crate::transfer::ThresholdGuard::save(10);
        let small = select_backend(5);
        assert_eq!(small.name(), "reference");
        let large = select_backend(50);
        #[cfg(feature = "parallel")]
        assert_eq!(large.name(), "parallel");
        #[cfg(not(feature = "parallel"))]
        assert_eq!(large.name(), "reference");
    }

    #[test]
    fn test_rejects_bad_star_temperature() {
        let atm = atmosphere(1400.0);
        let ab = abundances(atm.n_layers(), 0.0);
        let err = compute_eclipse_depths(
            R_SUN,
            0.0,
            &atm,
            &ab,
            &store(0.0),
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ForwardModelError::Validation(_)));
    }
}
