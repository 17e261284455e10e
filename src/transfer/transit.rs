//! Transit-depth integration over the stellar disk
//!
//! The optical-depth field gives the transmission e^(−τ) of a tangent ray
//! at each impact parameter. Integrating the blocked fraction over the
//! annulus each ray samples yields the wavelength-dependent transit depth:
//!
//! ```text
//! depth(λ) = (r_base/R_s)² + (2/R_s²) · Σ_i (1 − e^(−τ_iλ)) · b_i · Δr_i
//! ```
//!
//! The first term is the opaque disk up to the deepest transparent layer
//! (the cloud deck when one is present, the reference radius otherwise);
//! the sum adds the partially transparent annuli above it. Every term is
//! non-negative, so adding layers on top — e.g. by lowering the truncation
//! pressure — can only increase the depth.

use crate::atmosphere::{AtmosphereProfile, Layer};
use crate::chemistry::Abundances;
use crate::error::{ForwardModelError, Result};
use crate::opacity::OpacityStore;
use crate::transfer::optical_depth::{extinction_matrix, OpticalDepthField, ScatteringParams};

// =================================================================================================
// Cloud deck
// =================================================================================================

/// Opaque cloud deck: layers at or below this pressure level block all light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudDeck {
    /// Cloud-top pressure \[Pa\]
    pub top_pressure: f64,
}

impl CloudDeck {
    /// Validated cloud deck
    ///
    /// # Errors
    ///
    /// `Validation` for a non-positive or non-finite pressure.
    pub fn new(top_pressure: f64) -> Result<Self> {
        if !top_pressure.is_finite() || top_pressure <= 0.0 {
            return Err(ForwardModelError::validation(format!(
                "cloud-top pressure must be positive and finite, got {}",
                top_pressure
            )));
        }
        Ok(Self { top_pressure })
    }
}

// =================================================================================================
// Spectrum
// =================================================================================================

/// Final observable: ordered (wavelength, depth) pairs
///
/// Immutable and returned by value; the external fitting layer consumes the
/// two slices directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    wavelengths: Vec<f64>,
    depths: Vec<f64>,
}

impl Spectrum {
    /// Pair up wavelength and depth arrays
    ///
    /// # Errors
    ///
    /// `Validation` on length mismatch.
    pub fn new(wavelengths: Vec<f64>, depths: Vec<f64>) -> Result<Self> {
        if wavelengths.len() != depths.len() {
            return Err(ForwardModelError::validation(format!(
                "{} wavelengths but {} depths",
                wavelengths.len(),
                depths.len()
            )));
        }
        Ok(Self {
            wavelengths,
            depths,
        })
    }

    /// Wavelengths \[m\]
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Depths (dimensionless)
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    /// Number of spectral points
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Whether the spectrum is empty
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Iterate (wavelength, depth) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.wavelengths
            .iter()
            .copied()
            .zip(self.depths.iter().copied())
    }

    /// Average the spectrum into wavelength bins
    ///
    /// Each `(lo, hi)` bin is half-open: points with lo ≤ λ < hi are
    /// averaged, matching observed bandpasses that tile a wavelength range
    /// without double-counting edges. The returned wavelength of a bin is
    /// the mean of its member wavelengths.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty bin list, a reversed or non-finite bin, a
    /// bin reaching outside the tabulated wavelength range, or a bin that
    /// captures no spectral points.
    pub fn rebin(&self, bins: &[(f64, f64)]) -> Result<Spectrum> {
        if bins.is_empty() {
            return Err(ForwardModelError::validation("no wavelength bins given"));
        }
        let (grid_min, grid_max) = match (self.wavelengths.first(), self.wavelengths.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(ForwardModelError::validation(
                    "cannot rebin an empty spectrum",
                ))
            }
        };

        let mut wavelengths = Vec::with_capacity(bins.len());
        let mut depths = Vec::with_capacity(bins.len());
        for &(lo, hi) in bins {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(ForwardModelError::validation(format!(
                    "invalid wavelength bin [{}, {})",
                    lo, hi
                )));
            }
            if lo < grid_min || hi > grid_max {
                return Err(ForwardModelError::validation(format!(
                    "bin [{}, {}) outside the wavelength range [{}, {}]",
                    lo, hi, grid_min, grid_max
                )));
            }

            let mut sum_w = 0.0;
            let mut sum_d = 0.0;
            let mut count = 0usize;
            for (w, d) in self.iter() {
                if w >= lo && w < hi {
                    sum_w += w;
                    sum_d += d;
                    count += 1;
                }
            }
            if count == 0 {
                return Err(ForwardModelError::validation(format!(
                    "bin [{}, {}) captures no spectral points",
                    lo, hi
                )));
            }
            wavelengths.push(sum_w / count as f64);
            depths.push(sum_d / count as f64);
        }

        Spectrum::new(wavelengths, depths)
    }
}

// =================================================================================================
// Transit depths
// =================================================================================================

/// Layers above the cloud deck (all layers when `cloud` is `None`)
///
/// A deck pressure outside the open interval spanned by the layer stack is
/// rejected: below the base it would be unreachable, above the top it would
/// silently hide the whole atmosphere.
pub(crate) fn above_cloud<'a>(
    atmosphere: &'a AtmosphereProfile,
    abundances: &'a [Abundances],
    cloud: Option<&CloudDeck>,
) -> Result<(Vec<Layer>, Vec<Abundances>)> {
    if abundances.len() != atmosphere.n_layers() {
        return Err(ForwardModelError::validation(format!(
            "{} layers but {} abundance entries",
            atmosphere.n_layers(),
            abundances.len()
        )));
    }
    if let Some(deck) = cloud {
        let base_pressure = atmosphere.layers()[0].pressure;
        let top_pressure = atmosphere.layers()[atmosphere.n_layers() - 1].pressure;
        if deck.top_pressure <= top_pressure || deck.top_pressure >= base_pressure {
            return Err(ForwardModelError::validation(format!(
                "cloud-top pressure {} Pa outside the atmosphere's ({}, {}) Pa range",
                deck.top_pressure, top_pressure, base_pressure
            )));
        }
    }
    let keep = |layer: &Layer| match cloud {
        Some(deck) => layer.pressure < deck.top_pressure,
        None => true,
    };
    let layers: Vec<Layer> = atmosphere.layers().iter().filter(|l| keep(l)).copied().collect();
    let kept_abundances: Vec<Abundances> = atmosphere
        .layers()
        .iter()
        .zip(abundances)
        .filter(|(l, _)| keep(l))
        .map(|(_, a)| a.clone())
        .collect();
    Ok((layers, kept_abundances))
}

/// Compute the transit-depth spectrum for one atmosphere
///
/// A pure function of its inputs: the opacity store and abundances are
/// read-only, and the optical-depth field lives only for this call.
///
/// `scattering` falls back to plain Rayleigh ([`ScatteringParams::default`])
/// when unspecified; pass [`ScatteringParams::none`] to turn the term off.
///
/// # Errors
///
/// `Validation` for a non-positive star radius, misaligned abundances, or a
/// cloud deck outside the atmosphere's pressure range.
pub fn compute_transit_depths(
    star_radius: f64,
    atmosphere: &AtmosphereProfile,
    abundances: &[Abundances],
    opacities: &OpacityStore,
    cloud: Option<&CloudDeck>,
    scattering: Option<&ScatteringParams>,
) -> Result<Spectrum> {
    if !star_radius.is_finite() || star_radius <= 0.0 {
        return Err(ForwardModelError::validation(format!(
            "star radius must be positive, got {}",
            star_radius
        )));
    }

    let (layers, layer_abundances) = above_cloud(atmosphere, abundances, cloud)?;
    let wavelengths = opacities.wavelengths().to_vec();

    // A deck just under the truncation level can leave too few transparent
    // layers to integrate: the planet is then an opaque disk out to the top
    // of the atmosphere at every wavelength.
    if layers.len() < 2 {
        let depth = (atmosphere.top_radius() / star_radius).powi(2);
        let n = wavelengths.len();
        return Spectrum::new(wavelengths, vec![depth; n]);
    }

    let scattering = scattering.copied().unwrap_or_default();
    let extinction = extinction_matrix(&layers, &layer_abundances, opacities, &scattering)?;
    let field = OpticalDepthField::from_extinction(&extinction, &layers)?;

    let base_radius = layers[0].radius;
    let base_depth = (base_radius / star_radius).powi(2);
    let norm = 2.0 / (star_radius * star_radius);

    let tau = field.tau();
    let depths: Vec<f64> = (0..wavelengths.len())
        .map(|l| {
            let annuli: f64 = (0..field.n_heights())
                .map(|i| {
                    let blocked = 1.0 - (-tau[(i, l)]).exp();
                    blocked * field.impact_radii()[i] * field.shell_widths()[i]
                })
                .sum();
            base_depth + norm * annuli
        })
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
    use crate::constants::{M_JUP, R_JUP, R_SUN};
    use ndarray::Array3;

    fn store(sigma: f64) -> OpacityStore {
        let mut store = OpacityStore::new(
            vec![1.0e-6, 1.5e-6, 2.0e-6],
            vec![300.0, 3000.0],
            vec![1e-4, 1e8],
        )
        .unwrap();
        store
            .insert_species(Species::H2O, Array3::from_elem((3, 2, 2), sigma))
            .unwrap();
        store
    }

    fn atmosphere() -> AtmosphereProfile {
        AtmosphereBuilder::new()
            .with_profile_heights(120)
            .build(
                M_JUP,
                R_JUP,
                &TemperatureProfile::Isothermal(1200.0),
                |_, _| 2.3,
            )
            .unwrap()
    }

    fn uniform_abundances(n: usize, h2o: f64) -> Vec<Abundances> {
        let mut ab = Abundances::zeros();
        ab.set(Species::H2, 1.0 - h2o);
        ab.set(Species::H2O, h2o);
        vec![ab; n]
    }

    #[test]
    fn test_transparent_atmosphere_gives_bare_disk() {
        let atm = atmosphere();
        let ab = uniform_abundances(atm.n_layers(), 0.0);
        let off = ScatteringParams::none();
        let spectrum =
            compute_transit_depths(R_SUN, &atm, &ab, &store(0.0), None, Some(&off)).unwrap();
        let bare = (R_JUP / R_SUN).powi(2);
        for (_, depth) in spectrum.iter() {
            assert!((depth - bare).abs() / bare < 1e-12);
        }
    }

    #[test]
    fn test_unspecified_scattering_defaults_to_rayleigh() {
        // Pure H2, zero gas opacity: with scattering left unspecified the
        // spectrum must still carry the λ^-4 slope, not come out flat
        let atm = atmosphere();
        let ab = uniform_abundances(atm.n_layers(), 0.0);
        let spectrum =
            compute_transit_depths(R_SUN, &atm, &ab, &store(0.0), None, None).unwrap();

        let bare = (R_JUP / R_SUN).powi(2);
        let depths = spectrum.depths();
        assert!(depths[0] > bare, "Rayleigh slope must add depth");
        for pair in depths.windows(2) {
            assert!(pair[0] > pair[1], "depth must fall toward the red");
        }

        // Unspecified means exactly the Rayleigh defaults
        let explicit = compute_transit_depths(
            R_SUN,
            &atm,
            &ab,
            &store(0.0),
            None,
            Some(&ScatteringParams::default()),
        )
        .unwrap();
        assert_eq!(spectrum, explicit);
    }

    #[test]
    fn test_absorber_raises_depth_above_bare_disk() {
        let atm = atmosphere();
        let ab = uniform_abundances(atm.n_layers(), 1e-3);
        let spectrum =
            compute_transit_depths(R_SUN, &atm, &ab, &store(1e-27), None, None).unwrap();
        let bare = (R_JUP / R_SUN).powi(2);
        for (_, depth) in spectrum.iter() {
            assert!(depth > bare);
            assert!(depth < 0.02, "depth {} unphysically large", depth);
        }
    }

    #[test]
    fn test_cloud_deck_floors_the_spectrum() {
        let atm = atmosphere();
        let ab = uniform_abundances(atm.n_layers(), 0.0);
        let deck = CloudDeck::new(1e2).unwrap();
        let off = ScatteringParams::none();
        let spectrum = compute_transit_depths(
            R_SUN,
            &atm,
            &ab,
            &store(0.0),
            Some(&deck),
            Some(&off),
        )
        .unwrap();

        // With no gas opacity, depth equals the disk at the cloud-top radius
        let cloud_top = atm
            .layers()
            .iter()
            .find(|l| l.pressure < 1e2)
            .unwrap()
            .radius;
        let expected = (cloud_top / R_SUN).powi(2);
        for (_, depth) in spectrum.iter() {
            assert!((depth - expected).abs() / expected < 1e-9);
        }
    }

    #[test]
    fn test_full_cloud_cover_is_flat_at_top_radius() {
        let atm = atmosphere();
        let ab = uniform_abundances(atm.n_layers(), 1e-3);
        // Deck just under the truncation level: only the topmost layer stays
        // transparent, so the whole disk is opaque
        let deck = CloudDeck::new(1.1e-4).unwrap();
        let spectrum = compute_transit_depths(
            R_SUN,
            &atm,
            &ab,
            &store(1e-27),
            Some(&deck),
            None,
        )
        .unwrap();
        let expected = (atm.top_radius() / R_SUN).powi(2);
        for (_, depth) in spectrum.iter() {
            assert!((depth - expected).abs() / expected < 1e-12);
        }
    }

    #[test]
    fn test_cloud_deck_outside_pressure_range_rejected() {
        let atm = atmosphere();
        let ab = uniform_abundances(atm.n_layers(), 0.0);
        // Above the truncation level and below the reference level
        for pressure in [1e-5, 1e6] {
            let deck = CloudDeck::new(pressure).unwrap();
            let err = compute_transit_depths(
                R_SUN,
                &atm,
                &ab,
                &store(0.0),
                Some(&deck),
                None,
            )
            .unwrap_err();
            assert!(matches!(err, ForwardModelError::Validation(_)), "{}", pressure);
        }
    }

    #[test]
    fn test_rejects_bad_star_radius() {
        let atm = atmosphere();
        let ab = uniform_abundances(atm.n_layers(), 0.0);
        let err =
            compute_transit_depths(-1.0, &atm, &ab, &store(0.0), None, None).unwrap_err();
        assert!(matches!(err, ForwardModelError::Validation(_)));
    }

    #[test]
    fn test_spectrum_accessors() {
        let spectrum = Spectrum::new(vec![1e-6, 2e-6], vec![0.01, 0.011]).unwrap();
        assert_eq!(spectrum.len(), 2);
        assert!(!spectrum.is_empty());
        assert_eq!(spectrum.wavelengths()[1], 2e-6);
        assert_eq!(spectrum.depths()[0], 0.01);
        assert!(Spectrum::new(vec![1e-6], vec![]).is_err());
    }

    #[test]
    fn test_rebin_averages_within_bins() {
        let spectrum = Spectrum::new(
            vec![1e-6, 2e-6, 3e-6, 4e-6],
            vec![0.010, 0.020, 0.030, 0.040],
        )
        .unwrap();
        // Half-open bins: the 3 µm point belongs to the second bin only
        let binned = spectrum.rebin(&[(1e-6, 3e-6), (3e-6, 4e-6)]).unwrap();
        assert_eq!(binned.len(), 2);
        assert!((binned.wavelengths()[0] - 1.5e-6).abs() < 1e-18);
        assert!((binned.depths()[0] - 0.015).abs() < 1e-12);
        assert!((binned.depths()[1] - 0.030).abs() < 1e-12);
    }

    #[test]
    fn test_rebin_rejects_malformed_bins() {
        let spectrum =
            Spectrum::new(vec![1e-6, 2e-6, 3e-6], vec![0.01, 0.02, 0.03]).unwrap();
        for bins in [
            vec![],               // nothing to average into
            vec![(2e-6, 2e-6)],   // empty interval
            vec![(3e-6, 1e-6)],   // reversed bounds
            vec![(0.5e-6, 2e-6)], // reaches below the grid
            vec![(2e-6, 5e-6)],   // reaches above the grid
            vec![(1.1e-6, 1.9e-6)], // captures no points
        ] {
            let err = spectrum.rebin(&bins).unwrap_err();
            assert!(matches!(err, ForwardModelError::Validation(_)), "{:?}", bins);
        }
    }
}
