//! Common utilities for integration tests

pub mod fixtures;
pub mod test_helpers;

// Re-export commonly used items
pub use fixtures::{
    hot_jupiter_system, synthetic_chemistry, synthetic_opacities, synthetic_opacities_with_cia,
    test_wavelengths,
};
pub use test_helpers::{assert_spectra_close, relative_error};
