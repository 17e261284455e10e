//! Output module for computed spectra
//!
//! This module carries results out of the crate in two forms:
//! - **Export**: CSV data for external analysis tools
//! - **Visualization**: quick-look PNG plots via plotters, behind the
//!   `visualization` feature
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! ├── export/             ← Data export
//! │   ├── mod.rs
//! │   └── csv.rs
//! └── visualization/      ← Plots (feature-gated)
//!     ├── mod.rs
//!     └── spectrum.rs
//! ```
//!
//! Both sub-modules consume [`crate::transfer::Spectrum`] by reference and
//! never mutate it; the forward model stays unaware of presentation.

pub mod export;

#[cfg(feature = "visualization")]
pub mod visualization;

pub use export::{export_spectrum_csv, CsvConfig, CsvMetadata};

#[cfg(feature = "visualization")]
pub use visualization::{plot_spectra, plot_spectrum, PlotConfig};
