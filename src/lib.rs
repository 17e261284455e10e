//! transit-rs: Exoplanet Spectroscopy Forward Models
//!
//! A library for computing transmission (transit) and emission (eclipse)
//! spectra of exoplanet atmospheres from first principles. Built with Rust
//! for performance and safety.
//!
//! # Architecture
//!
//! transit-rs is built on two core principles:
//!
//! 1. **Separation of Composition and Transfer**
//!    - Chemistry answers "what is the atmosphere made of"
//!    - Radiative transfer answers "what does it look like"
//!
//! 2. **Immutable Shared State**
//!    - Opacity and chemistry tables are loaded once and shared read-only
//!    - Every forward-model call is a pure function of its parameters,
//!      safe to run concurrently from a fitting loop
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use transit_rs::prelude::*;
//!
//! // 1. Load the heavy shared tables once
//! let opacities = Arc::new(load_store(&OpacityConfig::new("data/opacities"))?);
//! let chemistry = Arc::new(ChemistryGrid::new(log_z, co, t, p, fractions)?);
//!
//! // 2. Bundle them into a forward model
//! let model = ForwardModel::new(opacities, chemistry);
//!
//! // 3. Compute a transit spectrum
//! let system = SystemParams {
//!     star_radius: R_SUN,
//!     star_temperature: TEFF_SUN,
//!     planet_mass: M_JUP,
//!     planet_radius: R_JUP,
//! };
//! let spectrum = model.transit_depths(
//!     &system,
//!     &TemperatureProfile::Isothermal(1200.0),
//!     &CompositionInput::Equilibrium { log_metallicity: 0.0, co_ratio: 0.53 },
//!     None,
//!     None,
//! )?;
//!
//! // 4. Access results
//! for (wavelength, depth) in spectrum.iter() {
//!     println!("{:e} m -> {:.1} ppm", wavelength, depth * 1e6);
//! }
//! ```
//!
//! # Modules
//!
//! - [`constants`]: Physical and astronomical constants (SI)
//! - [`chemistry`]: Species identities and equilibrium abundances
//! - [`opacity`]: Cross-section tables and their on-disk format
//! - [`atmosphere`]: Thermal profiles and hydrostatic equilibrium
//! - [`transfer`]: Optical depth, transit, and eclipse integration
//! - [`forward`]: The facade bundling everything per call
//! - [`output`]: Spectrum export and (optional) plotting

pub mod atmosphere;
pub mod chemistry;
pub mod constants;
pub mod error;
pub mod forward;
pub mod opacity;
pub mod output;
pub mod transfer;

pub use error::{ForwardModelError, Result};

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust,ignore
    //! use transit_rs::prelude::*;
    //! ```
    pub use crate::atmosphere::{AtmosphereBuilder, AtmosphereProfile, TemperatureProfile};
    pub use crate::chemistry::{
        AbundanceGetter, Abundances, ChemistryGrid, CustomAbundanceTable, Species,
    };
    pub use crate::constants::{M_EARTH, M_JUP, M_SUN, R_EARTH, R_JUP, R_SUN, TEFF_SUN};
    pub use crate::error::{ForwardModelError, Result};
    pub use crate::forward::{CompositionInput, ForwardModel, SystemParams};
    pub use crate::opacity::{load_store, OpacityConfig, OpacityStore};
    pub use crate::transfer::{
        compute_eclipse_depths, compute_transit_depths, CloudDeck, ScatteringParams, Spectrum,
    };
}
