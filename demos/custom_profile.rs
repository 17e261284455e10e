//! Example: Custom Temperature Profile and Custom Abundances
//!
//! Drives the forward model with user-supplied inputs instead of the
//! equilibrium grid:
//!
//! - a non-isothermal temperature-pressure profile (hot deep atmosphere,
//!   cooler upper atmosphere)
//! - a custom abundance table with a fixed CH4 mixing fraction
//!
//! This is the path for atmospheres out of chemical equilibrium, e.g.
//! quenched methane or photochemical products.

use std::sync::Arc;

use ndarray::{Array3, Array5};
use transit_rs::atmosphere::{AtmosphereBuilder, TemperatureProfile};
use transit_rs::chemistry::{ChemistryGrid, CustomAbundanceTable, Species, NUM_SPECIES};
use transit_rs::constants::{M_JUP, R_JUP, R_SUN, TEFF_SUN};
use transit_rs::forward::{CompositionInput, ForwardModel, SystemParams};

fn flat_opacities() -> Arc<transit_rs::opacity::OpacityStore> {
    let n = 100;
    let wavelengths: Vec<f64> = (0..n).map(|i| 1.0e-6 + i as f64 * 4e-8).collect();
    let mut store = transit_rs::opacity::OpacityStore::new(
        wavelengths,
        vec![300.0, 3000.0],
        vec![1e-4, 1e8],
    )
    .unwrap();
    store
        .insert_species(Species::CH4, Array3::from_elem((n, 2, 2), 2e-26))
        .unwrap();
    Arc::new(store)
}

fn placeholder_chemistry() -> Arc<ChemistryGrid> {
    // The grid is unused on the custom path but the facade still carries one
    let mut fractions = Array5::zeros((NUM_SPECIES, 2, 2, 2, 2));
    for iz in 0..2 {
        for ic in 0..2 {
            for it in 0..2 {
                for ip in 0..2 {
                    fractions[[Species::H2.index(), iz, ic, it, ip]] = 1.0;
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
    println!("  Custom Profile and Abundances");
    println!("═══════════════════════════════════════════════════════\n");

    // ====== Non-isothermal profile: 1600 K deep, 900 K aloft ======

    let n = 200;
    let pressures: Vec<f64> = (0..n)
        .map(|i| {
            let frac = i as f64 / (n - 1) as f64;
            (1e5f64.ln() + frac * (1e-4f64.ln() - 1e5f64.ln())).exp()
        })
        .collect();
    let temperatures: Vec<f64> = pressures
        .iter()
        .map(|p| {
            let x = (p.log10() + 4.0) / 9.0; // 0 at the top, 1 at the base
            900.0 + 700.0 * x
        })
        .collect();
    let profile = TemperatureProfile::custom(temperatures, pressures)?;

    // ====== Custom abundances: quenched CH4 at 1e-5 everywhere ======

    let table = CustomAbundanceTable::parse(
        "T P H2 He CH4\n\
         300 1e-4 0.84 0.16 1e-5\n\
         300 1e8 0.84 0.16 1e-5\n\
         3000 1e-4 0.84 0.16 1e-5\n\
         3000 1e8 0.84 0.16 1e-5\n",
    )?;

    println!("Profile: {} layers, 900-1600 K", n);
    println!("Composition: H2/He with CH4 = 1e-5 (quenched)\n");

    // ====== Run ======

    let system = SystemParams {
        star_radius: R_SUN,
        star_temperature: TEFF_SUN,
        planet_mass: M_JUP,
        planet_radius: R_JUP,
    };
    let model = ForwardModel::new(flat_opacities(), placeholder_chemistry())
        .with_builder(AtmosphereBuilder::new());

    let spectrum = model.transit_depths(
        &system,
        &profile,
        &CompositionInput::Custom(table),
        None,
        None,
    )?;

    let bare = (R_JUP / R_SUN).powi(2);
    println!("Bare disk depth : {:.1} ppm", bare * 1e6);
    for (i, (w, d)) in spectrum.iter().enumerate() {
        if i % 25 == 0 {
            println!("  {:.3} um -> {:.1} ppm", w * 1e6, d * 1e6);
        }
    }

    Ok(())
}
