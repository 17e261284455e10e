//! Equilibrium chemistry: species identities and abundance interpolation
//!
//! This module owns the composition side of the forward model:
//!
//! - [`Species`]: type-safe identifiers for the 34 supported species
//! - [`ChemistryGrid`]: dense precomputed equilibrium abundances over
//!   (metallicity, C/O, temperature, pressure)
//! - [`AbundanceGetter`]: query interface, plus import of user-supplied
//!   custom tables ([`CustomAbundanceTable`])
//!
//! # Architecture
//!
//! Chemistry is **separate from radiative transfer**: this module answers
//! "what is the atmosphere made of at (Z, C/O, T, P)" and nothing else.
//! The transfer core consumes the resulting per-layer fractions without
//! knowing where they came from, which is what makes the equilibrium and
//! custom paths interchangeable at the facade.

pub mod getter;
pub mod grid;
pub mod species;

pub use getter::{AbundanceGetter, CustomAbundanceTable};
pub use grid::{Abundances, ChemistryGrid};
pub use species::{Species, NUM_SPECIES};
