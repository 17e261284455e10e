//! Hydrostatic equilibrium with height-dependent gravity
//!
//! The builder integrates
//!
//! ```text
//! dr = (k_B T / (mu · amu · g(r))) · d ln P,    g(r) = G·M / r²
//! ```
//!
//! outward from the reference pressure level, recomputing the local
//! gravitational acceleration at every step instead of holding it constant.
//! Compared to a constant-gravity model this inflates the upper atmosphere
//! and increases the computed transit depth.
//!
//! The atmosphere is truncated at a low-pressure cutoff, default 1e-4 Pa.
//! This is deliberately far above the 0.1 Pa cutoff of older codes: the
//! extra decades of high-altitude material absorb measurably in strong
//! lines.

use crate::atmosphere::profile::{AtmosphereProfile, Layer, TemperatureProfile};
use crate::constants::{AMU, G_GRAV, K_B};
use crate::error::{ForwardModelError, Result};

/// Default number of layers in a generated pressure grid
pub const DEFAULT_PROFILE_HEIGHTS: usize = 250;

/// Default reference (deep) pressure \[Pa\]
pub const DEFAULT_REF_PRESSURE: f64 = 1e5;

/// Default low-pressure truncation \[Pa\]
pub const DEFAULT_MIN_PRESSURE: f64 = 1e-4;

/// Below this layer count the discretization error becomes visible in the
/// regression bounds, so the builder warns (but proceeds)
const COARSE_RESOLUTION_WARNING: usize = 50;

// =================================================================================================
// Builder
// =================================================================================================

/// Constructs an [`AtmosphereProfile`] under hydrostatic equilibrium
///
/// The planet radius is defined at the reference pressure level; every
/// generated pressure grid is log-spaced from the reference pressure down
/// to the truncation pressure.
#[derive(Debug, Clone)]
pub struct AtmosphereBuilder {
    /// Number of layers in generated grids (ignored for custom profiles)
    pub num_profile_heights: usize,
    /// Reference (deep) pressure \[Pa\] where radius equals the planet radius
    pub ref_pressure: f64,
    /// Low-pressure truncation \[Pa\]
    pub min_pressure: f64,
}

impl Default for AtmosphereBuilder {
    fn default() -> Self {
        Self {
            num_profile_heights: DEFAULT_PROFILE_HEIGHTS,
            ref_pressure: DEFAULT_REF_PRESSURE,
            min_pressure: DEFAULT_MIN_PRESSURE,
        }
    }
}

impl AtmosphereBuilder {
    /// Builder with the default resolution and pressure bounds
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the layer count
    pub fn with_profile_heights(mut self, n: usize) -> Self {
        self.num_profile_heights = n;
        self
    }

    /// Override the truncation pressure \[Pa\]
    pub fn with_min_pressure(mut self, p: f64) -> Self {
        self.min_pressure = p;
        self
    }

    /// Integrate hydrostatic equilibrium into a discretized atmosphere
    ///
    /// `mean_molecular_weight` maps a layer (temperature \[K\], pressure
    /// \[Pa\]) to its mean molecular weight in amu; the facade supplies a
    /// closure backed by either the equilibrium grid or a custom table.
    ///
    /// # Errors
    ///
    /// `Validation` for non-positive mass/radius, a degenerate pressure
    /// range, or a custom profile that lies entirely outside the truncation
    /// window.
    pub fn build<F>(
        &self,
        planet_mass: f64,
        planet_radius: f64,
        profile: &TemperatureProfile,
        mean_molecular_weight: F,
    ) -> Result<AtmosphereProfile>
    where
        F: Fn(f64, f64) -> f64,
    {
        if planet_mass <= 0.0 || !planet_mass.is_finite() {
            return Err(ForwardModelError::validation(format!(
                "planet mass must be positive, got {}",
                planet_mass
            )));
        }
        if planet_radius <= 0.0 || !planet_radius.is_finite() {
            return Err(ForwardModelError::validation(format!(
                "planet radius must be positive, got {}",
                planet_radius
            )));
        }

        let (pressures, temperatures) = self.pressure_temperature_grid(profile)?;

        // Integrate outward: radius at the deepest layer is the planet radius
        let mut layers = Vec::with_capacity(pressures.len());
        let mu0 = mean_molecular_weight(temperatures[0], pressures[0]);
        layers.push(Layer::new(pressures[0], temperatures[0], planet_radius, mu0));

        for i in 1..pressures.len() {
            let previous = layers[i - 1];
            let t_mid = 0.5 * (previous.temperature + temperatures[i]);
            let mu = mean_molecular_weight(temperatures[i], pressures[i]);
            let mu_mid = 0.5 * (previous.mean_molecular_weight + mu);
            if mu_mid <= 0.0 {
                return Err(ForwardModelError::validation(
                    "mean molecular weight must be positive",
                ));
            }

            // Local gravity from the previous radius, not a constant surface value
            let g = G_GRAV * planet_mass / (previous.radius * previous.radius);
            let scale_height = K_B * t_mid / (mu_mid * AMU * g);
            let dr = scale_height * (previous.pressure / pressures[i]).ln();

            layers.push(Layer::new(
                pressures[i],
                temperatures[i],
                previous.radius + dr,
                mu,
            ));
        }

        AtmosphereProfile::new(layers)
    }

    /// Resolve the (pressure, temperature) grid `build` will integrate over
    ///
    /// Exposed so callers that need per-layer quantities before integration
    /// (composition, mean molecular weight) can evaluate them on exactly the
    /// grid the builder uses.
    pub fn pressure_temperature_grid(
        &self,
        profile: &TemperatureProfile,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        match profile {
            TemperatureProfile::Isothermal(t) => {
                if !t.is_finite() || *t <= 0.0 {
                    return Err(ForwardModelError::validation(format!(
                        "isothermal temperature must be positive, got {}",
                        t
                    )));
                }
                if self.min_pressure >= self.ref_pressure {
                    return Err(ForwardModelError::validation(
                        "truncation pressure must be below the reference pressure",
                    ));
                }
                if self.num_profile_heights < 2 {
                    return Err(ForwardModelError::validation(
                        "num_profile_heights must be at least 2",
                    ));
                }
                if self.num_profile_heights < COARSE_RESOLUTION_WARNING {
                    log::warn!(
                        "num_profile_heights = {} is coarse; depths may be inaccurate",
                        self.num_profile_heights
                    );
                }

                let n = self.num_profile_heights;
                let log_top = self.min_pressure.ln();
                let log_base = self.ref_pressure.ln();
                let pressures: Vec<f64> = (0..n)
                    .map(|i| {
                        let frac = i as f64 / (n - 1) as f64;
                        (log_base + frac * (log_top - log_base)).exp()
                    })
                    .collect();
                let temperatures = vec![*t; n];
                Ok((pressures, temperatures))
            }
            TemperatureProfile::Custom {
                temperatures,
                pressures,
            } => {
                // Keep only layers inside the truncation window
                let kept: Vec<(f64, f64)> = pressures
                    .iter()
                    .zip(temperatures)
                    .filter(|(p, _)| **p >= self.min_pressure)
                    .map(|(p, t)| (*p, *t))
                    .collect();
                if kept.len() < 2 {
                    return Err(ForwardModelError::validation(
                        "custom profile has fewer than 2 layers above the truncation pressure",
                    ));
                }
                Ok(kept.into_iter().unzip())
            }
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
