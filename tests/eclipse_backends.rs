//! Backend-equivalence and export tests
//!
//! The emission integral has two execution substrates (serial reference and
//! rayon-parallel). These tests pin them to each other and check that a
//! computed spectrum survives the trip through CSV export.

mod common;

use common::{hot_jupiter_system, synthetic_chemistry, synthetic_opacities};
use transit_rs::atmosphere::{AtmosphereBuilder, TemperatureProfile};
use transit_rs::forward::{CompositionInput, ForwardModel};
use transit_rs::output::{export_spectrum_csv, CsvConfig, CsvMetadata};
use transit_rs::transfer::{planck, ReferenceBackend};

fn model() -> ForwardModel {
    ForwardModel::new(synthetic_opacities(1e-27, 1e-28), synthetic_chemistry())
        .with_builder(AtmosphereBuilder::new().with_profile_heights(120))
}

#[test]
fn test_explicit_reference_backend_matches_default_selection() {
    let m = model();
    let profile = TemperatureProfile::Isothermal(1500.0);
    let composition = CompositionInput::Equilibrium {
        log_metallicity: 0.0,
        co_ratio: 0.5,
    };

    let auto = m
        .eclipse_depths(&hot_jupiter_system(), &profile, &composition, None, None, None)
        .unwrap();
    let reference = m
        .eclipse_depths(
            &hot_jupiter_system(),
            &profile,
            &composition,
            None,
            None,
            Some(&ReferenceBackend),
        )
        .unwrap();

    // Below the dispatch threshold the automatic choice is the reference
    // backend, so the two runs must agree to the bit
    assert_eq!(auto, reference);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_backend_matches_reference() {
    use common::assert_spectra_close;
    use transit_rs::transfer::ParallelBackend;

    let m = model();
    let profile = TemperatureProfile::Isothermal(1500.0);
    let composition = CompositionInput::Equilibrium {
        log_metallicity: 0.0,
        co_ratio: 0.5,
    };

    let reference = m
        .eclipse_depths(
            &hot_jupiter_system(),
            &profile,
            &composition,
            None,
            None,
            Some(&ReferenceBackend),
        )
        .unwrap();
    let parallel = m
        .eclipse_depths(
            &hot_jupiter_system(),
            &profile,
            &composition,
            None,
            None,
            Some(&ParallelBackend),
        )
        .unwrap();

    assert_spectra_close(&reference, &parallel, 1e-12, "backend equivalence");
}

#[test]
fn test_isothermal_eclipse_tracks_the_planck_ratio() {
    let system = hot_jupiter_system();
    let spectrum = model()
        .eclipse_depths(
            &system,
            &TemperatureProfile::Isothermal(1500.0),
            &CompositionInput::Equilibrium {
                log_metallicity: 0.0,
                co_ratio: 0.5,
            },
            None,
            None,
            None,
        )
        .unwrap();

    // An isothermal column emits as a blackbody at its own temperature, so
    // the depth is the Planck ratio scaled by the area ratio
    for (w, depth) in spectrum.iter() {
        let expected = planck(w, 1500.0) / planck(w, system.star_temperature)
            * (system.planet_radius / system.star_radius).powi(2);
        let err = (depth - expected).abs() / expected;
        assert!(err < 0.05, "depth {} vs blackbody estimate {}", depth, expected);
    }
}

#[test]
fn test_spectrum_survives_csv_round_trip() {
    let spectrum = model()
        .transit_depths(
            &hot_jupiter_system(),
            &TemperatureProfile::Isothermal(1200.0),
            &CompositionInput::Equilibrium {
                log_metallicity: 0.0,
                co_ratio: 0.5,
            },
            None,
            None,
        )
        .unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    let config = CsvConfig::default()
        .precision(12)
        .with_metadata(CsvMetadata::for_mode("transit"));
    export_spectrum_csv(&spectrum, file.path(), Some(&config)).unwrap();

    let content = std::fs::read_to_string(file.path()).unwrap();
    assert!(content.contains("# Mode: transit"));

    let mut parsed = 0;
    for line in content.lines().filter(|l| !l.starts_with('#')).skip(1) {
        let mut fields = line.split(',');
        let w: f64 = fields.next().unwrap().parse().unwrap();
        let d: f64 = fields.next().unwrap().parse().unwrap();
        let (expected_w, expected_d) = spectrum.iter().nth(parsed).unwrap();
        assert!((w - expected_w).abs() / expected_w < 1e-10);
        assert!((d - expected_d).abs() / expected_d < 1e-10);
        parsed += 1;
    }
    assert_eq!(parsed, spectrum.len());
}
