//! Physical constants in SI units
//!
//! Shared by every module. Values follow CODATA 2018 where applicable;
//! astronomical reference values (Jupiter, Sun) use the IAU nominal
//! conversion constants.

/// Boltzmann constant \[J/K\]
pub const K_B: f64 = 1.380_649e-23;

/// Atomic mass unit \[kg\]
pub const AMU: f64 = 1.660_539_066_60e-27;

/// Gravitational constant \[m³/(kg·s²)\]
pub const G_GRAV: f64 = 6.674_30e-11;

/// Planck constant \[J·s\]
pub const H_PLANCK: f64 = 6.626_070_15e-34;

/// Speed of light in vacuum \[m/s\]
pub const C_LIGHT: f64 = 2.997_924_58e8;

/// Nominal solar radius \[m\]
pub const R_SUN: f64 = 6.957e8;

/// Nominal solar mass \[kg\]
pub const M_SUN: f64 = 1.989e30;

/// Solar effective temperature \[K\]
pub const TEFF_SUN: f64 = 5778.0;

/// Nominal Jupiter equatorial radius \[m\]
pub const R_JUP: f64 = 7.1492e7;

/// Nominal Jupiter mass \[kg\]
pub const M_JUP: f64 = 1.898e27;

/// Nominal Earth radius \[m\]
pub const R_EARTH: f64 = 6.378e6;

/// Nominal Earth mass \[kg\]
pub const M_EARTH: f64 = 5.972e24;
