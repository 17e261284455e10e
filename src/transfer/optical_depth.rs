//! Extinction assembly and line-of-sight optical depth
//!
//! # Extinction
//!
//! Per layer and wavelength, the extinction coefficient \[1/m\] is
//!
//! ```text
//! k = n · Σ_s x_s σ_s(λ, T, P)                  gas absorption
//!   + Σ_(s1,s2) (x_s1 n)(x_s2 n) k_CIA(λ, T)    collision-induced
//!   + A · (128π⁵/3) λ_ref^(slope−4) n Σ_s x_s α_s² / λ^slope   scattering
//! ```
//!
//! where n is the layer number density, x_s the mixing fractions and α_s
//! the species polarizability. With slope = 4 and A = 1 the scattering term
//! is plain Rayleigh scattering.
//!
//! # Line-of-sight geometry
//!
//! For a tangent ray at impact parameter b_i = r_i, the chord through the
//! spherical shell \[r_j, r_{j+1}\] (j ≥ i) has length
//!
//! ```text
//! 2·(√(r_{j+1}² − b_i²) − √(r_j² − b_i²))
//! ```
//!
//! Collecting these lengths into a path matrix P (heights × shells) and the
//! shell extinctions into K (shells × wavelengths), the whole optical-depth
//! field is one dense product τ = P·K. This is the hot path: a naive triple
//! loop here is an order of magnitude slower than the dense kernel.

use nalgebra::DMatrix;

use crate::atmosphere::Layer;
use crate::chemistry::{Abundances, Species};
use crate::error::{ForwardModelError, Result};
use crate::opacity::OpacityStore;

/// Rayleigh prefactor 128π⁵/3
const SCATTERING_PREFACTOR: f64 = 128.0 / 3.0
    * (std::f64::consts::PI
        * std::f64::consts::PI
        * std::f64::consts::PI
        * std::f64::consts::PI
        * std::f64::consts::PI);

// =================================================================================================
// Scattering parameters
// =================================================================================================

/// Parametric scattering slope and amplitude
///
/// Defaults reproduce Rayleigh scattering (slope 4, unit amplitude,
/// reference wavelength 1 µm). A steeper slope or larger amplitude mimics
/// haze-enhanced scattering without modeling particles explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringParams {
    /// Multiplicative amplitude A (dimensionless)
    pub amplitude: f64,
    /// Power-law slope in wavelength
    pub slope: f64,
    /// Reference wavelength \[m\] anchoring non-Rayleigh slopes
    pub ref_wavelength: f64,
}

impl ScatteringParams {
    /// Disabled scattering: zero amplitude removes the term entirely
    pub fn none() -> Self {
        Self {
            amplitude: 0.0,
            ..Self::default()
        }
    }
}

impl Default for ScatteringParams {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            slope: 4.0,
            ref_wavelength: 1e-6,
        }
    }
}

// =================================================================================================
// Extinction assembly
// =================================================================================================

/// Assemble the per-layer extinction matrix, shape (layers × wavelengths)
///
/// `abundances` must hold one entry per layer, aligned with `layers`.
/// Species absent from the opacity store contribute no gas absorption (the
/// supported missing-file trade-off); they still scatter if they carry a
/// polarizability, and still enter CIA pairs. The scattering term is always
/// assembled; [`ScatteringParams::none`] zeroes its amplitude.
///
/// # Errors
///
/// `Validation` when the abundance slice is not aligned with the layers.
pub fn extinction_matrix(
    layers: &[Layer],
    abundances: &[Abundances],
    opacities: &OpacityStore,
    scattering: &ScatteringParams,
) -> Result<DMatrix<f64>> {
    if layers.len() != abundances.len() {
        return Err(ForwardModelError::validation(format!(
            "{} layers but {} abundance entries",
            layers.len(),
            abundances.len()
        )));
    }

    let wavelengths = opacities.wavelengths();
    let n_lambda = wavelengths.len();
    let mut extinction = DMatrix::zeros(layers.len(), n_lambda);

    for (l, (layer, ab)) in layers.iter().zip(abundances).enumerate() {
        let n = layer.number_density;

        // Gas absorption: n · Σ_s x_s σ_s
        for species in opacities.absorbing_species() {
            let x = ab.get(species);
            if x <= 0.0 {
                continue;
            }
            let Some(sigma) =
                opacities.cross_section_row(species, layer.temperature, layer.pressure)
            else {
                continue;
            };
            let weight = x * n;
            for j in 0..n_lambda {
                extinction[(l, j)] += weight * sigma[j];
            }
        }

        // Collision-induced absorption: n1·n2·k
        for (s1, s2, k) in opacities.collisional_rows(layer.temperature) {
            let n1 = ab.get(s1) * n;
            let n2 = ab.get(s2) * n;
            if n1 <= 0.0 || n2 <= 0.0 {
                continue;
            }
            let weight = n1 * n2;
            for j in 0..n_lambda {
                extinction[(l, j)] += weight * k[j];
            }
        }

        // Parametric scattering slope
        let sum_polarizability_sqr: f64 = Species::ALL
            .iter()
            .map(|s| ab.get(*s) * s.polarizability().powi(2))
            .sum();
        let prefactor = scattering.amplitude
            * SCATTERING_PREFACTOR
            * scattering.ref_wavelength.powf(scattering.slope - 4.0)
            * n
            * sum_polarizability_sqr;
        if prefactor > 0.0 {
            for (j, lambda) in wavelengths.iter().enumerate() {
                extinction[(l, j)] += prefactor / lambda.powf(scattering.slope);
            }
        }
    }

    Ok(extinction)
}

// =================================================================================================
// Optical depth field
// =================================================================================================

/// Line-of-sight optical depth over (impact height × wavelength)
///
/// Owned by a single transfer invocation and never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct OpticalDepthField {
    /// τ values, shape (heights × wavelengths)
    tau: DMatrix<f64>,
    /// Impact parameters b_i \[m\], one per height
    impact_radii: Vec<f64>,
    /// Radial shell widths Δr_i \[m\], one per height
    shell_widths: Vec<f64>,
    /// Shell mid temperatures \[K\], used by the emission integral
    shell_temperatures: Vec<f64>,
    /// Per-shell vertical optical depth, shape (shells × wavelengths)
    d_tau_vertical: DMatrix<f64>,
}

impl OpticalDepthField {
    /// Integrate an extinction matrix through the layered geometry
    ///
    /// `layers` must be deep-first with strictly increasing radii (the
    /// atmosphere-profile invariant) and aligned with the extinction rows.
    pub fn from_extinction(extinction: &DMatrix<f64>, layers: &[Layer]) -> Result<Self> {
        if layers.len() != extinction.nrows() {
            return Err(ForwardModelError::validation(format!(
                "{} layers but {} extinction rows",
                layers.len(),
                extinction.nrows()
            )));
        }
        if layers.len() < 2 {
            return Err(ForwardModelError::validation(
                "optical depth needs at least 2 layers",
            ));
        }

        let n_shells = layers.len() - 1;
        let n_lambda = extinction.ncols();

        // Shell extinction: trapezoid of the bounding layer values
        let shell_extinction = DMatrix::from_fn(n_shells, n_lambda, |j, l| {
            0.5 * (extinction[(j, l)] + extinction[(j + 1, l)])
        });

        // Geometric path matrix, zero where the ray passes above the shell
        let radii: Vec<f64> = layers.iter().map(|l| l.radius).collect();
        let path = DMatrix::from_fn(n_shells, n_shells, |i, j| {
            if j < i {
                return 0.0;
            }
            let b_sqr = radii[i] * radii[i];
            let outer = (radii[j + 1] * radii[j + 1] - b_sqr).max(0.0).sqrt();
            let inner = (radii[j] * radii[j] - b_sqr).max(0.0).sqrt();
            2.0 * (outer - inner)
        });

        // The dense contraction: τ = P·K through nalgebra's matmul kernel
        let tau = &path * &shell_extinction;

        let shell_widths: Vec<f64> = radii.windows(2).map(|w| w[1] - w[0]).collect();
        let shell_temperatures: Vec<f64> = layers
            .windows(2)
            .map(|w| 0.5 * (w[0].temperature + w[1].temperature))
            .collect();
        let d_tau_vertical = DMatrix::from_fn(n_shells, n_lambda, |j, l| {
            shell_extinction[(j, l)] * shell_widths[j]
        });

        Ok(Self {
            tau,
            impact_radii: radii[..n_shells].to_vec(),
            shell_widths,
            shell_temperatures,
            d_tau_vertical,
        })
    }

    /// τ matrix, shape (heights × wavelengths)
    pub fn tau(&self) -> &DMatrix<f64> {
        &self.tau
    }

    /// Impact parameters \[m\]
    pub fn impact_radii(&self) -> &[f64] {
        &self.impact_radii
    }

    /// Shell widths \[m\]
    pub fn shell_widths(&self) -> &[f64] {
        &self.shell_widths
    }

    /// Shell mid temperatures \[K\]
    pub fn shell_temperatures(&self) -> &[f64] {
        &self.shell_temperatures
    }

    /// Per-shell vertical optical depth, shape (shells × wavelengths)
    pub fn d_tau_vertical(&self) -> &DMatrix<f64> {
        &self.d_tau_vertical
    }

    /// Number of impact heights
    pub fn n_heights(&self) -> usize {
        self.impact_radii.len()
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::Layer;
    use crate::chemistry::Abundances;
    use ndarray::Array3;

    fn uniform_store(sigma: f64) -> OpacityStore {
        let mut store = OpacityStore::new(
            vec![1e-6, 2e-6],
            vec![500.0, 2000.0],
            vec![1e-4, 1e8],
        )
        .unwrap();
        store
            .insert_species(Species::H2O, Array3::from_elem((2, 2, 2), sigma))
            .unwrap();
        store
    }

    fn two_layers() -> Vec<Layer> {
        vec![
            Layer::new(1e5, 1000.0, 7.0e7, 2.3),
            Layer::new(1e3, 1000.0, 7.02e7, 2.3),
        ]
    }

    #[test]
    fn test_extinction_is_linear_in_abundance() {
        let store = uniform_store(1e-28);
        let layers = two_layers();

        let mut ab_lo = Abundances::zeros();
        ab_lo.set(Species::H2O, 1e-4);
        let mut ab_hi = Abundances::zeros();
        ab_hi.set(Species::H2O, 2e-4);

        let off = ScatteringParams::none();
        let k_lo =
            extinction_matrix(&layers, &[ab_lo.clone(), ab_lo], &store, &off).unwrap();
        let k_hi =
            extinction_matrix(&layers, &[ab_hi.clone(), ab_hi], &store, &off).unwrap();
        assert!((k_hi[(0, 0)] - 2.0 * k_lo[(0, 0)]).abs() / k_hi[(0, 0)] < 1e-12);
    }

    #[test]
    fn test_zero_abundance_means_zero_gas_extinction() {
        let store = uniform_store(1e-28);
        let layers = two_layers();
        let k = extinction_matrix(
            &layers,
            &[Abundances::zeros(), Abundances::zeros()],
            &store,
            &ScatteringParams::default(),
        )
        .unwrap();
        // Zero abundance also removes the scattering term
        assert_eq!(k[(0, 0)], 0.0);
        assert_eq!(k[(1, 1)], 0.0);
    }

    #[test]
    fn test_scattering_falls_with_wavelength() {
        let store = uniform_store(0.0);
        let layers = two_layers();
        let mut ab = Abundances::zeros();
        ab.set(Species::H2, 1.0);
        let k = extinction_matrix(
            &layers,
            &[ab.clone(), ab],
            &store,
            &ScatteringParams::default(),
        )
        .unwrap();
        // Rayleigh: sigma ~ λ^-4, so doubling λ divides by 16
        assert!((k[(0, 0)] / k[(0, 1)] - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_scattering_contributes_nothing() {
        let store = uniform_store(0.0);
        let layers = two_layers();
        let mut ab = Abundances::zeros();
        ab.set(Species::H2, 1.0);
        let k = extinction_matrix(
            &layers,
            &[ab.clone(), ab],
            &store,
            &ScatteringParams::none(),
        )
        .unwrap();
        assert_eq!(k[(0, 0)], 0.0);
        assert_eq!(k[(1, 1)], 0.0);
    }

    #[test]
    fn test_misaligned_abundances_rejected() {
        let store = uniform_store(1e-28);
        let layers = two_layers();
        let err =
            extinction_matrix(&layers, &[Abundances::zeros()], &store, &ScatteringParams::none())
                .unwrap_err();
        assert!(matches!(err, ForwardModelError::Validation(_)));
    }

    #[test]
    fn test_tau_matches_hand_computed_chord() {
        // Single shell with constant extinction k: tau at the tangent ray
        // should be exactly k * 2*sqrt(r1² - r0²)
        let layers = two_layers();
        let k = 1e-7;
        let n_lambda = 2;
        let extinction = DMatrix::from_element(2, n_lambda, k);
        let field = OpticalDepthField::from_extinction(&extinction, &layers).unwrap();

        let r0 = layers[0].radius;
        let r1 = layers[1].radius;
        let expected = k * 2.0 * (r1 * r1 - r0 * r0).sqrt();
        assert!((field.tau()[(0, 0)] - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn test_vertical_depth_uses_shell_width() {
        let layers = two_layers();
        let extinction = DMatrix::from_element(2, 1, 1e-7);
        let field = OpticalDepthField::from_extinction(&extinction, &layers).unwrap();
        let width = layers[1].radius - layers[0].radius;
        assert!((field.d_tau_vertical()[(0, 0)] - 1e-7 * width).abs() < 1e-15);
    }
}
