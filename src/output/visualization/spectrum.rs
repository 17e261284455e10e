//! Static spectrum plots
//!
//! Quick-look PNG rendering of computed spectra using `plotters`. Axes are
//! rescaled for readability (microns on x, parts-per-million on y); the
//! numeric spectrum itself stays in SI throughout the crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use transit_rs::output::visualization::{plot_spectrum, PlotConfig};
//!
//! let mut config = PlotConfig::default();
//! config.title = "HD 209458 b".to_string();
//! plot_spectrum(&spectrum, "transit.png", Some(&config))?;
//! ```

use plotters::prelude::*;
use std::error::Error;

use crate::transfer::Spectrum;

// =================================================================================================
// Configuration
// =================================================================================================

/// Configuration for customizing spectrum plots
#[derive(Clone)]
pub struct PlotConfig {
    /// Image width in pixels (default: 1024)
    pub width: u32,

    /// Image height in pixels (default: 768)
    pub height: u32,

    /// Plot title (default: "Spectrum")
    pub title: String,

    /// X-axis label (default: "Wavelength (um)")
    pub xlabel: String,

    /// Y-axis label (default: "Depth (ppm)")
    pub ylabel: String,

    /// Line color for single-spectrum plots (default: RED)
    pub line_color: RGBColor,

    /// Optional colors for overlay plots, one per spectrum
    ///
    /// If None, a default palette cycles.
    pub series_colors: Option<Vec<RGBColor>>,

    /// Background color (default: WHITE)
    pub background: RGBColor,

    /// Line width in pixels (default: 2)
    pub line_width: u32,

    /// Show grid lines (default: true)
    pub show_grid: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Spectrum".to_string(),
            xlabel: "Wavelength (um)".to_string(),
            ylabel: "Depth (ppm)".to_string(),
            line_color: RED,
            series_colors: None,
            background: WHITE,
            line_width: 2,
            show_grid: true,
        }
    }
}

impl PlotConfig {
    /// Color for the overlay series at index i
    fn series_color(&self, index: usize) -> RGBColor {
        if let Some(colors) = &self.series_colors {
            if index < colors.len() {
                return colors[index];
            }
        }
        let palette = [
            RED,
            BLUE,
            GREEN,
            MAGENTA,
            CYAN,
            BLACK,
            RGBColor(255, 165, 0),
            RGBColor(128, 0, 128),
        ];
        palette[index % palette.len()]
    }
}

// =================================================================================================
// Plotting
// =================================================================================================

const METERS_TO_MICRONS: f64 = 1e6;
const DEPTH_TO_PPM: f64 = 1e6;

/// Draw one or more spectra onto a drawing area
fn draw_on_area<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    spectra: &[&Spectrum],
    labels: &[&str],
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for spectrum in spectra {
        for (w, d) in spectrum.iter() {
            let x = w * METERS_TO_MICRONS;
            let y = d * DEPTH_TO_PPM;
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    // 10% vertical margin
    let y_range = (y_max - y_min).max(f64::MIN_POSITIVE);
    let y_lo = y_min - 0.1 * y_range;
    let y_hi = y_max + 0.1 * y_range;

    root.fill(&config.background)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&config.title, ("sans-serif", 40.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_lo..y_hi)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(&config.xlabel).y_desc(&config.ylabel);
    if config.show_grid {
        mesh.draw()?;
    } else {
        mesh.disable_mesh().draw()?;
    }

    for (i, spectrum) in spectra.iter().enumerate() {
        let color = if spectra.len() == 1 {
            config.line_color
        } else {
            config.series_color(i)
        };
        let series = chart.draw_series(LineSeries::new(
            spectrum
                .iter()
                .map(|(w, d)| (w * METERS_TO_MICRONS, d * DEPTH_TO_PPM)),
            color.stroke_width(config.line_width),
        ))?;
        if let Some(label) = labels.get(i) {
            series.label(*label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }
    }

    if !labels.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Plot a single spectrum to a PNG file
pub fn plot_spectrum(
    spectrum: &Spectrum,
    output_path: &str,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    if spectrum.is_empty() {
        return Err("cannot plot an empty spectrum".into());
    }
    let default_config = PlotConfig::default();
    let config = config.unwrap_or(&default_config);

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    draw_on_area(&root, &[spectrum], &[], config)
}

/// Overlay several labelled spectra in one PNG, e.g. clear vs cloudy models
pub fn plot_spectra(
    spectra: &[&Spectrum],
    labels: &[&str],
    output_path: &str,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    if spectra.is_empty() {
        return Err("cannot plot an empty set of spectra".into());
    }
    if spectra.len() != labels.len() {
        return Err(format!(
            "{} spectra but {} labels",
            spectra.len(),
            labels.len()
        )
        .into());
    }
    let default_config = PlotConfig::default();
    let config = config.unwrap_or(&default_config);

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    draw_on_area(&root, spectra, labels, config)
}

// =================================================================================================
// Tests
// =================================================================================================
