//! Example: Hot Jupiter - Clear vs Cloudy Transit Spectrum
//!
//! Computes the transmission spectrum of a Jupiter-analog on synthetic
//! opacity tables, once with a clear atmosphere and once with an opaque
//! cloud deck at 100 Pa, then computes the matching eclipse spectrum.
//!
//! **Physical System**:
//! - Star: Sun-like (R = 1 R_sun, T_eff = 5778 K)
//! - Planet: 1 M_jup, 1 R_jup, isothermal at 1200 K
//! - Composition: equilibrium chemistry at solar metallicity, C/O = 0.53
//!
//! Real work replaces the synthetic tables with tables loaded via
//! `opacity::load_store` and a full chemistry grid; the pipeline is
//! identical.

use std::sync::Arc;

use ndarray::{Array3, Array5};
use transit_rs::atmosphere::{AtmosphereBuilder, TemperatureProfile};
use transit_rs::chemistry::{ChemistryGrid, Species, NUM_SPECIES};
use transit_rs::constants::{M_JUP, R_JUP, R_SUN, TEFF_SUN};
use transit_rs::forward::{CompositionInput, ForwardModel, SystemParams};
use transit_rs::output::{export_spectrum_csv, CsvConfig, CsvMetadata};
use transit_rs::transfer::{CloudDeck, ScatteringParams};

fn synthetic_opacities() -> Arc<transit_rs::opacity::OpacityStore> {
    let n = 200;
    let wavelengths: Vec<f64> = (0..n).map(|i| 0.5e-6 + i as f64 * 2.25e-8).collect();
    let mut store = transit_rs::opacity::OpacityStore::new(
        wavelengths.clone(),
        vec![300.0, 3000.0],
        vec![1e-4, 1e8],
    )
    .unwrap();

    // A synthetic water band: Gaussian bump around 1.4 microns
    let sigma: Vec<f64> = wavelengths
        .iter()
        .map(|w| {
            let x = (w * 1e6 - 1.4) / 0.15;
            1e-27 * (1.0 + 30.0 * (-x * x).exp())
        })
        .collect();
    let mut table = Array3::zeros((n, 2, 2));
    for (i, s) in sigma.iter().enumerate() {
        for it in 0..2 {
            for ip in 0..2 {
                table[[i, it, ip]] = *s;
            }
        }
    }
    store.insert_species(Species::H2O, table).unwrap();
    Arc::new(store)
}

fn synthetic_chemistry() -> Arc<ChemistryGrid> {
    let mut fractions = Array5::zeros((NUM_SPECIES, 2, 2, 2, 2));
    for iz in 0..2 {
        for ic in 0..2 {
            for it in 0..2 {
                for ip in 0..2 {
                    fractions[[Species::H2.index(), iz, ic, it, ip]] = 0.85;
                    fractions[[Species::He.index(), iz, ic, it, ip]] = 0.1495;
                    fractions[[Species::H2O.index(), iz, ic, it, ip]] = 5e-4;
                }
            }
        }
    }
    Arc::new(
        ChemistryGrid::new(
            vec![-1.0, 3.0],
            vec![0.05, 2.0],
            vec![300.0, 3000.0],
            vec![1e-4, 1e8],
            fractions,
        )
        .unwrap(),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("═══════════════════════════════════════════════════════");
    println!("  Hot Jupiter - Transit and Eclipse Spectra");
    println!("═══════════════════════════════════════════════════════\n");

    // ====== System parameters ======

    let system = SystemParams {
        star_radius: R_SUN,
        star_temperature: TEFF_SUN,
        planet_mass: M_JUP,
        planet_radius: R_JUP,
    };

    println!("System:");
    println!("  R_star  : {:.3e} m", system.star_radius);
    println!("  T_star  : {} K", system.star_temperature);
    println!("  M_p     : {:.3e} kg", system.planet_mass);
    println!("  R_p     : {:.3e} m\n", system.planet_radius);

    // ====== Forward model ======

    let model = ForwardModel::new(synthetic_opacities(), synthetic_chemistry())
        .with_builder(AtmosphereBuilder::new().with_profile_heights(250));

    let profile = TemperatureProfile::Isothermal(1200.0);
    let composition = CompositionInput::Equilibrium {
        log_metallicity: 0.0,
        co_ratio: 0.53,
    };

    // ====== Clear transit ======

    let clear = model.transit_depths(
        &system,
        &profile,
        &composition,
        None,
        Some(&ScatteringParams::default()),
    )?;

    // ====== Cloudy transit: opaque deck at 100 Pa ======

    let deck = CloudDeck::new(100.0)?;
    let cloudy = model.transit_depths(
        &system,
        &profile,
        &composition,
        Some(&deck),
        Some(&ScatteringParams::default()),
    )?;

    println!("Transit depths (ppm):");
    println!("  {:>12} {:>10} {:>10}", "lambda (um)", "clear", "cloudy");
    for i in (0..clear.len()).step_by(40) {
        let (w, d_clear) = clear.iter().nth(i).unwrap();
        let (_, d_cloudy) = cloudy.iter().nth(i).unwrap();
        println!(
            "  {:>12.3} {:>10.1} {:>10.1}",
            w * 1e6,
            d_clear * 1e6,
            d_cloudy * 1e6
        );
    }

    // ====== Eclipse ======

    let eclipse = model.eclipse_depths(&system, &profile, &composition, None, None, None)?;
    let (w0, d0) = eclipse.iter().next().unwrap();
    println!("\nEclipse depth at {:.2} um: {:.1} ppm", w0 * 1e6, d0 * 1e6);

    // ====== Export ======

    let out = std::env::temp_dir().join("hot_jupiter_transit.csv");
    let mut metadata = CsvMetadata::for_mode("transit");
    metadata.star_radius = Some(system.star_radius);
    metadata.planet_mass = Some(system.planet_mass);
    metadata.planet_radius = Some(system.planet_radius);
    metadata.log_metallicity = Some(0.0);
    metadata.co_ratio = Some(0.53);
    export_spectrum_csv(
        &clear,
        &out,
        Some(&CsvConfig::default().with_metadata(metadata)),
    )?;
    println!("Clear spectrum exported to {}", out.display());

    Ok(())
}
