//! Data export, always compiled

pub mod csv;

pub use csv::{export_spectrum_csv, CsvConfig, CsvMetadata};
