//! Forward-model facade
//!
//! One handle bundling the heavy shared state (opacity store, equilibrium
//! chemistry grid, builder configuration) behind two entry points,
//! [`ForwardModel::transit_depths`] and [`ForwardModel::eclipse_depths`].
//! Each call runs the full pipeline:
//!
//! 1. resolve the (pressure, temperature) grid for the thermal profile
//! 2. resolve per-layer composition (equilibrium grid or custom table)
//! 3. integrate hydrostatic equilibrium into a radial layer stack
//! 4. hand off to the radiative transfer core
//!
//! The facade owns nothing mutable: `Arc`-shared stores make concurrent
//! calls from a fitting loop safe without locks.

use std::sync::Arc;

use crate::atmosphere::{AtmosphereBuilder, AtmosphereProfile, TemperatureProfile};
use crate::chemistry::{Abundances, AbundanceGetter, ChemistryGrid, CustomAbundanceTable};
use crate::error::{ForwardModelError, Result};
use crate::opacity::OpacityStore;
use crate::transfer::{
    compute_eclipse_depths, compute_transit_depths, CloudDeck, EmissionBackend, ScatteringParams,
    Spectrum,
};

// =================================================================================================
// Inputs
// =================================================================================================

/// Bulk parameters of the star-planet system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemParams {
    /// Stellar radius \[m\]
    pub star_radius: f64,
    /// Stellar effective temperature \[K\], used in eclipse mode
    pub star_temperature: f64,
    /// Planet mass \[kg\]
    pub planet_mass: f64,
    /// Planet radius \[m\] at the reference pressure level
    pub planet_radius: f64,
}

/// Source of per-layer composition
///
/// The two variants are mutually exclusive by construction; there is no way
/// to express "equilibrium chemistry plus a custom table" and no silent
/// precedence rule to remember.
#[derive(Debug, Clone)]
pub enum CompositionInput {
    /// Interpolate the equilibrium grid at each layer's (T, P)
    Equilibrium {
        /// log10 metallicity relative to solar
        log_metallicity: f64,
        /// Carbon-to-oxygen ratio
        co_ratio: f64,
    },
    /// Sample a user-supplied (T, P) table at each layer
    Custom(CustomAbundanceTable),
}

impl CompositionInput {
    /// Assemble from optional parts, rejecting ambiguous combinations
    ///
    /// # Errors
    ///
    /// `Validation` when a table is given together with equilibrium
    /// parameters, when only one of the two equilibrium parameters is
    /// present, or when nothing is given at all.
    pub fn from_parts(
        log_metallicity: Option<f64>,
        co_ratio: Option<f64>,
        table: Option<CustomAbundanceTable>,
    ) -> Result<Self> {
        match (log_metallicity, co_ratio, table) {
            (None, None, Some(table)) => Ok(Self::Custom(table)),
            (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => Err(ForwardModelError::validation(
                "custom abundances and equilibrium parameters are mutually exclusive",
            )),
            (Some(log_metallicity), Some(co_ratio), None) => Ok(Self::Equilibrium {
                log_metallicity,
                co_ratio,
            }),
            (Some(_), None, None) | (None, Some(_), None) => Err(ForwardModelError::validation(
                "equilibrium chemistry needs both log metallicity and C/O ratio",
            )),
            (None, None, None) => Err(ForwardModelError::validation(
                "no composition given; provide equilibrium parameters or a custom table",
            )),
        }
    }
}

// =================================================================================================
// Facade
// =================================================================================================

/// Shared-state forward model producing transit and eclipse spectra
///
/// Construction is cheap; the expensive opacity and chemistry loads happen
/// once, upstream, and are shared here by `Arc`.
#[derive(Debug, Clone)]
pub struct ForwardModel {
    opacities: Arc<OpacityStore>,
    getter: AbundanceGetter,
    builder: AtmosphereBuilder,
}

impl ForwardModel {
    /// Bundle an opacity store and a chemistry grid with default builder
    /// settings
    pub fn new(opacities: Arc<OpacityStore>, chemistry: Arc<ChemistryGrid>) -> Self {
        Self {
            opacities,
            getter: AbundanceGetter::new(chemistry),
            builder: AtmosphereBuilder::new(),
        }
    }

    /// Override the atmosphere builder configuration
    pub fn with_builder(mut self, builder: AtmosphereBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// The shared opacity store
    pub fn opacities(&self) -> &OpacityStore {
        &self.opacities
    }

    /// The equilibrium-chemistry handle
    pub fn getter(&self) -> &AbundanceGetter {
        &self.getter
    }

    /// Transit-depth spectrum for one parameter set
    ///
    /// Leaving `scattering` unspecified applies plain Rayleigh scattering;
    /// pass [`ScatteringParams::none`] to model an atmosphere without a
    /// scattering slope.
    ///
    /// # Errors
    ///
    /// `Range` when equilibrium chemistry is queried outside the tabulated
    /// grid; `Validation` for inconsistent inputs.
    pub fn transit_depths(
        &self,
        system: &SystemParams,
        profile: &TemperatureProfile,
        composition: &CompositionInput,
        cloud: Option<&CloudDeck>,
        scattering: Option<&ScatteringParams>,
    ) -> Result<Spectrum> {
        let (atmosphere, abundances) = self.build_atmosphere(system, profile, composition)?;
        compute_transit_depths(
            system.star_radius,
            &atmosphere,
            &abundances,
            &self.opacities,
            cloud,
            scattering,
        )
    }

    /// Eclipse-depth spectrum for one parameter set
    ///
    /// `backend` overrides the automatic emission-backend selection.
    ///
    /// # Errors
    ///
    /// As [`ForwardModel::transit_depths`], plus `Validation` for a
    /// non-positive stellar temperature.
    pub fn eclipse_depths(
        &self,
        system: &SystemParams,
        profile: &TemperatureProfile,
        composition: &CompositionInput,
        cloud: Option<&CloudDeck>,
        scattering: Option<&ScatteringParams>,
        backend: Option<&dyn EmissionBackend>,
    ) -> Result<Spectrum> {
        let (atmosphere, abundances) = self.build_atmosphere(system, profile, composition)?;
        compute_eclipse_depths(
            system.star_radius,
            system.star_temperature,
            &atmosphere,
            &abundances,
            &self.opacities,
            cloud,
            scattering,
            backend,
        )
    }

    /// Shared head of both pipelines: composition, then hydrostatics
    fn build_atmosphere(
        &self,
        system: &SystemParams,
        profile: &TemperatureProfile,
        composition: &CompositionInput,
    ) -> Result<(AtmosphereProfile, Vec<Abundances>)> {
        let (pressures, temperatures) = self.builder.pressure_temperature_grid(profile)?;

        // Composition first: equilibrium queries must fail with the exact
        // out-of-range point before any integration work is done.
        let abundances: Vec<Abundances> = pressures
            .iter()
            .zip(&temperatures)
            .map(|(p, t)| match composition {
                CompositionInput::Equilibrium {
                    log_metallicity,
                    co_ratio,
                } => self.getter.get(*log_metallicity, *co_ratio, *t, *p),
                CompositionInput::Custom(table) => Ok(table.sample(*t, *p)),
            })
            .collect::<Result<_>>()?;

        let mus: Vec<f64> = abundances.iter().map(|a| a.mean_molecular_weight()).collect();
        if mus.iter().any(|mu| *mu <= 0.0 || !mu.is_finite()) {
            return Err(ForwardModelError::validation(
                "composition yields a non-positive mean molecular weight",
            ));
        }

        // The builder re-asks for mu at each grid point; answer from the
        // precomputed per-layer values by nearest pressure.
        let mu_of = |_t: f64, p: f64| -> f64 {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (i, q) in pressures.iter().enumerate() {
                let d = (q - p).abs();
                if d < best_distance {
                    best_distance = d;
                    best = i;
                }
            }
            mus[best]
        };

        let atmosphere =
            self.builder
                .build(system.planet_mass, system.planet_radius, profile, mu_of)?;

        if atmosphere.n_layers() != abundances.len() {
            return Err(ForwardModelError::validation(format!(
                "internal layer mismatch: {} layers, {} abundance rows",
                atmosphere.n_layers(),
                abundances.len()
            )));
        }
        Ok((atmosphere, abundances))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
