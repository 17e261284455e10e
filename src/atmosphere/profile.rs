//! Temperature-pressure profiles and the discretized atmosphere
//!
//! A [`TemperatureProfile`] is the *input* description of the thermal
//! structure: either a parametric isothermal profile or a fully custom
//! (T, P) array pair. The mutually exclusive choice is a tagged union, so
//! a mixed specification cannot be expressed at all.
//!
//! An [`AtmosphereProfile`] is the *output* of hydrostatic integration: an
//! ordered stack of layers from the deep reference pressure up to the
//! truncation pressure, each carrying pressure, temperature, radius, total
//! number density and mean molecular weight.

use crate::constants::K_B;
use crate::error::{ForwardModelError, Result};

// =================================================================================================
// Temperature profile (input)
// =================================================================================================

/// Thermal structure supplied to the atmosphere builder
#[derive(Debug, Clone)]
pub enum TemperatureProfile {
    /// Single temperature \[K\] applied to every layer; the pressure grid is
    /// generated by the builder (log-spaced, reference to truncation)
    Isothermal(f64),

    /// User-supplied (temperature \[K\], pressure \[Pa\]) arrays
    ///
    /// Construct through [`TemperatureProfile::custom`] so the length and
    /// monotonicity invariants are checked exactly once.
    Custom {
        /// Layer temperatures, same order as `pressures`
        temperatures: Vec<f64>,
        /// Layer pressures, strictly decreasing (deep first)
        pressures: Vec<f64>,
    },
}

impl TemperatureProfile {
    /// Validated custom profile
    ///
    /// Arrays must be equal length, at least 2 points, with temperatures
    /// positive and pressures strictly monotonic. Ascending pressure input
    /// is accepted and reversed so that storage is always deep-first.
    ///
    /// # Errors
    ///
    /// `Validation` when any invariant fails.
    pub fn custom(temperatures: Vec<f64>, pressures: Vec<f64>) -> Result<Self> {
        if temperatures.len() != pressures.len() {
            return Err(ForwardModelError::validation(format!(
                "custom profile arrays differ in length: {} temperatures vs {} pressures",
                temperatures.len(),
                pressures.len()
            )));
        }
        if temperatures.len() < 2 {
            return Err(ForwardModelError::validation(
                "custom profile needs at least 2 points",
            ));
        }
        if temperatures.iter().any(|t| !t.is_finite() || *t <= 0.0) {
            return Err(ForwardModelError::validation(
                "custom profile temperatures must be positive and finite",
            ));
        }
        if pressures.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(ForwardModelError::validation(
                "custom profile pressures must be positive and finite",
            ));
        }

        let decreasing = pressures.windows(2).all(|w| w[1] < w[0]);
        let increasing = pressures.windows(2).all(|w| w[1] > w[0]);
        match (decreasing, increasing) {
            (true, _) => Ok(Self::Custom {
                temperatures,
                pressures,
            }),
            (_, true) => {
                let mut temperatures = temperatures;
                let mut pressures = pressures;
                temperatures.reverse();
                pressures.reverse();
                Ok(Self::Custom {
                    temperatures,
                    pressures,
                })
            }
            _ => Err(ForwardModelError::validation(
                "custom profile pressures must be strictly monotonic",
            )),
        }
    }
}

// =================================================================================================
// Atmosphere profile (output)
// =================================================================================================

/// One discretized atmospheric layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Pressure \[Pa\]
    pub pressure: f64,
    /// Temperature \[K\]
    pub temperature: f64,
    /// Radial coordinate from planet center \[m\]
    pub radius: f64,
    /// Total number density n = P / (k_B T) \[1/m³\]
    pub number_density: f64,
    /// Mean molecular weight \[amu\]
    pub mean_molecular_weight: f64,
}

impl Layer {
    /// Build a layer, deriving the ideal-gas number density
    pub fn new(pressure: f64, temperature: f64, radius: f64, mean_molecular_weight: f64) -> Self {
        Self {
            pressure,
            temperature,
            radius,
            number_density: pressure / (K_B * temperature),
            mean_molecular_weight,
        }
    }
}

/// Discretized atmosphere under hydrostatic equilibrium
///
/// Layers are ordered deep-first: index 0 sits at the reference pressure
/// with `radius == planet_radius`, the last layer at the truncation
/// pressure. Radius is strictly increasing along the stack; this invariant
/// is established by the builder and assumed by the transfer core.
#[derive(Debug, Clone)]
pub struct AtmosphereProfile {
    layers: Vec<Layer>,
}

impl AtmosphereProfile {
    /// Wrap a validated layer stack
    ///
    /// # Errors
    ///
    /// `Validation` when fewer than 2 layers are supplied, or when radius is
    /// not strictly increasing while pressure decreases.
    pub fn new(layers: Vec<Layer>) -> Result<Self> {
        if layers.len() < 2 {
            return Err(ForwardModelError::validation(
                "atmosphere needs at least 2 layers",
            ));
        }
        for pair in layers.windows(2) {
            if pair[1].pressure >= pair[0].pressure {
                return Err(ForwardModelError::validation(
                    "layer pressures must strictly decrease outward",
                ));
            }
            if pair[1].radius <= pair[0].radius {
                return Err(ForwardModelError::validation(
                    "layer radii must strictly increase outward",
                ));
            }
        }
        Ok(Self { layers })
    }

    /// Layer stack, deep-first
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// Radius of the deepest layer \[m\]
    pub fn base_radius(&self) -> f64 {
        self.layers[0].radius
    }

    /// Radius of the outermost layer \[m\]
    pub fn top_radius(&self) -> f64 {
        self.layers[self.layers.len() - 1].radius
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_profile_rejects_length_mismatch() {
        let err = TemperatureProfile::custom(vec![1000.0, 900.0], vec![1e5]).unwrap_err();
        assert!(matches!(err, ForwardModelError::Validation(_)));
    }

    #[test]
    fn test_custom_profile_rejects_non_monotonic_pressure() {
        let err = TemperatureProfile::custom(
            vec![1000.0, 900.0, 800.0],
            vec![1e5, 1e6, 1e4],
        )
        .unwrap_err();
        assert!(matches!(err, ForwardModelError::Validation(_)));
    }

    #[test]
    fn test_ascending_pressure_is_normalized_deep_first() {
        let profile = TemperatureProfile::custom(
            vec![800.0, 900.0, 1000.0],
            vec![1e3, 1e4, 1e5],
        )
        .unwrap();
        let TemperatureProfile::Custom { pressures, temperatures } = profile else {
            panic!("expected custom profile");
        };
        assert_eq!(pressures, vec![1e5, 1e4, 1e3]);
        assert_eq!(temperatures, vec![1000.0, 900.0, 800.0]);
    }

    #[test]
    fn test_profile_invariant_enforced() {
        let good = vec![
            Layer::new(1e5, 1000.0, 7.0e7, 2.3),
            Layer::new(1e4, 1000.0, 7.1e7, 2.3),
        ];
        assert!(AtmosphereProfile::new(good).is_ok());

        let bad = vec![
            Layer::new(1e5, 1000.0, 7.1e7, 2.3),
            Layer::new(1e4, 1000.0, 7.0e7, 2.3),
        ];
        assert!(AtmosphereProfile::new(bad).is_err());
    }

    #[test]
    fn test_layer_number_density() {
        let layer = Layer::new(1e5, 1000.0, 7e7, 2.3);
        let expected = 1e5 / (K_B * 1000.0);
        assert!((layer.number_density - expected).abs() / expected < 1e-12);
    }
}
