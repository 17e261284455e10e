//! Plotting utilities, compiled with the `visualization` feature

pub mod spectrum;

pub use spectrum::{plot_spectra, plot_spectrum, PlotConfig};
