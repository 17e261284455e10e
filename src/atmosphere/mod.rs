//! Atmosphere construction: thermal profiles and hydrostatic equilibrium
//!
//! Separation of concerns mirrors the rest of the crate:
//!
//! - [`TemperatureProfile`] says WHAT the thermal structure is
//! - [`AtmosphereBuilder`] says HOW to turn it into a radial grid
//!   (hydrostatic integration with height-dependent gravity)
//! - [`AtmosphereProfile`] is the resulting immutable layer stack consumed
//!   by the radiative transfer core

pub mod hydrostatic;
pub mod profile;

pub use hydrostatic::{
    AtmosphereBuilder, DEFAULT_MIN_PRESSURE, DEFAULT_PROFILE_HEIGHTS, DEFAULT_REF_PRESSURE,
};
pub use profile::{AtmosphereProfile, Layer, TemperatureProfile};
