//! Helper functions for integration tests

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// Assert two spectra agree element-wise within a relative tolerance
pub fn assert_spectra_close(
    a: &transit_rs::transfer::Spectrum,
    b: &transit_rs::transfer::Spectrum,
    tolerance: f64,
    message: &str,
) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", message);
    for (i, ((wa, da), (wb, db))) in a.iter().zip(b.iter()).enumerate() {
        assert_eq!(wa, wb, "{}: wavelength {} differs", message, i);
        let err = relative_error(da, db);
        assert!(
            err < tolerance,
            "{}: depth {} differs by {} (tolerance {})",
            message,
            i,
            err,
            tolerance
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_error() {
        assert!((relative_error(1.0, 1.0) - 0.0).abs() < 1e-10);
        assert!((relative_error(1.1, 1.0) - 0.1).abs() < 1e-10);
        assert!((relative_error(0.9, 1.0) - 0.1).abs() < 1e-10);
    }
}
