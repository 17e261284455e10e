//! CSV export for computed spectra
//!
//! Writes (wavelength, depth) pairs to CSV for downstream analysis in
//! Python, Excel, or plotting tools. Values are written in scientific
//! notation; wavelengths are meters and depths are dimensionless, matching
//! the units used throughout the crate.
//!
//! # Quick Example
//!
//! ```rust,ignore
//! use transit_rs::output::export::export_spectrum_csv;
//!
//! export_spectrum_csv(&spectrum, "transit.csv", None)?;
//! ```
//!
//! **Output** (`transit.csv`):
//! ```csv
//! Wavelength (m),Depth
//! 1.000000e-6,1.052310e-2
//! 1.100000e-6,1.054902e-2
//! ```
//!
//! With metadata enabled the file opens with `#`-prefixed header comments
//! recording the generating parameters, so a spectrum on disk stays
//! self-describing.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{ForwardModelError, Result};
use crate::transfer::Spectrum;

// =================================================================================================
// Configuration
// =================================================================================================

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Significant digits after the decimal point (default: 6)
    pub precision: usize,

    /// Include metadata header comments (default: false)
    pub include_metadata: bool,

    /// Metadata to include in the header
    pub metadata: Option<CsvMetadata>,

    /// Header for the wavelength column (default: "Wavelength (m)")
    pub wavelength_header: String,

    /// Header for the depth column (default: "Depth")
    pub depth_header: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            precision: 6,
            include_metadata: false,
            metadata: None,
            wavelength_header: "Wavelength (m)".to_string(),
            depth_header: "Depth".to_string(),
        }
    }
}

impl CsvConfig {
    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }
}

/// Metadata for CSV header comments
///
/// All fields are optional; only set fields appear in the header.
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    /// Observation geometry (e.g., "transit", "eclipse")
    pub mode: Option<String>,

    /// Stellar radius \[m\]
    pub star_radius: Option<f64>,

    /// Planet mass \[kg\]
    pub planet_mass: Option<f64>,

    /// Planet radius \[m\]
    pub planet_radius: Option<f64>,

    /// log10 metallicity relative to solar
    pub log_metallicity: Option<f64>,

    /// C/O ratio
    pub co_ratio: Option<f64>,

    /// Additional custom parameters
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Metadata naming just the observation geometry
    pub fn for_mode(mode: &str) -> Self {
        Self {
            mode: Some(mode.to_string()),
            ..Default::default()
        }
    }

    /// Add a custom key-value parameter
    pub fn add_custom(&mut self, key: String, value: String) {
        self.custom.push((key, value));
    }
}

// =================================================================================================
// Helpers
// =================================================================================================

/// Write `#`-prefixed metadata comments
fn write_metadata_header(file: &mut File, metadata: &CsvMetadata) -> Result<()> {
    writeln!(file, "# Spectrum")?;
    writeln!(file, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(mode) = &metadata.mode {
        writeln!(file, "# Mode: {}", mode)?;
    }
    if let Some(r) = metadata.star_radius {
        writeln!(file, "# Star Radius: {} m", r)?;
    }
    if let Some(m) = metadata.planet_mass {
        writeln!(file, "# Planet Mass: {} kg", m)?;
    }
    if let Some(r) = metadata.planet_radius {
        writeln!(file, "# Planet Radius: {} m", r)?;
    }
    if let Some(z) = metadata.log_metallicity {
        writeln!(file, "# log10 Metallicity: {}", z)?;
    }
    if let Some(co) = metadata.co_ratio {
        writeln!(file, "# C/O Ratio: {}", co)?;
    }
    for (key, value) in &metadata.custom {
        writeln!(file, "# {}: {}", key, value)?;
    }
    writeln!(file, "#")?;
    Ok(())
}

/// Scientific-notation formatting at the configured precision
fn format_number(value: f64, config: &CsvConfig) -> String {
    format!("{:.prec$e}", value, prec = config.precision)
}

// =================================================================================================
// Export
// =================================================================================================

/// Export a spectrum to CSV
///
/// # Errors
///
/// `Validation` for an empty spectrum or non-finite values; `Io` for file
/// creation or write failures.
pub fn export_spectrum_csv(
    spectrum: &Spectrum,
    output_path: impl AsRef<Path>,
    config: Option<&CsvConfig>,
) -> Result<()> {
    if spectrum.is_empty() {
        return Err(ForwardModelError::validation(
            "refusing to export an empty spectrum",
        ));
    }
    if spectrum.iter().any(|(w, d)| !w.is_finite() || !d.is_finite()) {
        return Err(ForwardModelError::validation(
            "spectrum contains NaN or infinite values",
        ));
    }

    let default_config = CsvConfig::default();
    let config = config.unwrap_or(&default_config);

    let mut file = File::create(output_path.as_ref())?;

    if config.include_metadata {
        if let Some(metadata) = &config.metadata {
            write_metadata_header(&mut file, metadata)?;
        }
    }

    writeln!(
        file,
        "{}{}{}",
        config.wavelength_header, config.delimiter, config.depth_header
    )?;

    for (wavelength, depth) in spectrum.iter() {
        writeln!(
            file,
            "{}{}{}",
            format_number(wavelength, config),
            config.delimiter,
            format_number(depth, config)
        )?;
    }

    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
