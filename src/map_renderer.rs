use crate::app_config::Map;
use chrono::DateTime;
use thiserror::Error;
use tracing::debug;

const GRATICULE_STEP_DEG: f64 = 30.0;
const SAMPLE_MARKER_RADIUS: f64 = 4.0;
const FINAL_MARKER_RADIUS: f64 = 2.5;

/// Geographic extent of a set of samples, in degrees.
#[derive(Debug, Clone, Copy)]
struct GeoExtent {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl GeoExtent {
    fn new() -> Self {
        GeoExtent {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
        }
    }

    fn update(&mut self, latitude: f64, longitude: f64) {
        self.min_lat = self.min_lat.min(latitude);
        self.max_lat = self.max_lat.max(latitude);
        self.min_lon = self.min_lon.min(longitude);
        self.max_lon = self.max_lon.max(longitude);
    }

    /// The extent padded by a fixed margin on every side.
    fn padded(&self, margin_deg: f64) -> GeoExtent {
        GeoExtent {
            min_lat: self.min_lat - margin_deg,
            max_lat: self.max_lat + margin_deg,
            min_lon: self.min_lon - margin_deg,
            max_lon: self.max_lon + margin_deg,
        }
    }

    fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// Renders the sampled path as an equirectangular world-map SVG: a graticule
/// base, one marker per sample, a highlighted final position, and a title with
/// the session statistics. The viewport is fitted to the sample extent plus
/// the configured margin.
pub fn render(
    coordinates: &[(f64, f64)],
    timestamps: &[i64],
    average_speed: f64,
    period_seconds: u64,
    config: &Map,
) -> Result<String, RenderError> {
    if coordinates.is_empty() {
        return Err(RenderError::EmptyPath);
    }
    if coordinates.len() != timestamps.len() {
        return Err(RenderError::LengthMismatch {
            coordinates: coordinates.len(),
            timestamps: timestamps.len(),
        });
    }

    let mut extent = GeoExtent::new();
    for (latitude, longitude) in coordinates {
        extent.update(*latitude, *longitude);
    }
    let viewport = extent.padded(config.margin_deg());
    if viewport.width() <= 0.0 || viewport.height() <= 0.0 {
        return Err(RenderError::DegenerateViewport);
    }
    debug!(
        "Rendering {} samples into viewport ({}, {}) to ({}, {})",
        coordinates.len(),
        viewport.min_lat,
        viewport.min_lon,
        viewport.max_lat,
        viewport.max_lon
    );

    let width = config.width() as f64;
    let height = config.height() as f64;
    let project = |latitude: f64, longitude: f64| {
        let x = (longitude - viewport.min_lon) / viewport.width() * width;
        let y = (viewport.max_lat - latitude) / viewport.height() * height;
        (x, y)
    };

    let mut svg = String::with_capacity(2048 + coordinates.len() * 64);
    svg.push_str(&format!(
        r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <style>
      .ocean {{ fill: lightblue; }}
      .graticule {{ stroke: white; stroke-width: 0.5; }}
      .axis {{ stroke: gray; stroke-width: 1; }}
      .sample-marker {{ fill: red; }}
      .final-marker {{ fill: blue; }}
      .title {{ font: 13px sans-serif; fill: black; }}
    </style>
  </defs>
  <rect class="ocean" width="{w}" height="{h}" />"#,
        w = config.width(),
        h = config.height()
    ));

    // Graticule within the viewport, equator and prime meridian emphasized
    let mut longitude = -180.0;
    while longitude <= 180.0 {
        if longitude >= viewport.min_lon && longitude <= viewport.max_lon {
            let (x, _) = project(0.0, longitude);
            let class = if longitude == 0.0 { "axis" } else { "graticule" };
            svg.push_str(&format!("\n  <line class=\"{class}\" x1=\"{x:.2}\" y1=\"0\" x2=\"{x:.2}\" y2=\"{height}\" />"));
        }
        longitude += GRATICULE_STEP_DEG;
    }
    let mut latitude = -90.0;
    while latitude <= 90.0 {
        if latitude >= viewport.min_lat && latitude <= viewport.max_lat {
            let (_, y) = project(latitude, 0.0);
            let class = if latitude == 0.0 { "axis" } else { "graticule" };
            svg.push_str(&format!("\n  <line class=\"{class}\" x1=\"0\" y1=\"{y:.2}\" x2=\"{width}\" y2=\"{y:.2}\" />"));
        }
        latitude += GRATICULE_STEP_DEG;
    }

    for (latitude, longitude) in coordinates {
        let (x, y) = project(*latitude, *longitude);
        svg.push_str(&format!(
            "\n  <circle class=\"sample-marker\" cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{SAMPLE_MARKER_RADIUS}\" />"
        ));
    }

    // The last reported position, drawn on top of its sample marker
    let (last_latitude, last_longitude) = coordinates[coordinates.len() - 1];
    let (x, y) = project(last_latitude, last_longitude);
    svg.push_str(&format!(
        "\n  <circle class=\"final-marker\" cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{FINAL_MARKER_RADIUS}\" />"
    ));

    let first_time = format_time(timestamps[0])?;
    let last_time = format_time(timestamps[timestamps.len() - 1])?;
    svg.push_str(&format!(
        "\n  <text class=\"title\" x=\"10\" y=\"20\">ISS travel path, time range: {} to {}. Avg speed: {} m/s. Period of: {} seconds, {} samples.</text>",
        first_time,
        last_time,
        average_speed,
        period_seconds,
        coordinates.len()
    ));

    svg.push_str("\n</svg>\n");

    Ok(svg)
}

fn format_time(timestamp: i64) -> Result<String, RenderError> {
    let datetime = DateTime::from_timestamp(timestamp, 0).ok_or(RenderError::TimestampOutOfRange(timestamp))?;
    Ok(datetime.format("%H:%M:%S").to_string())
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot render an empty path")]
    EmptyPath,
    #[error("{coordinates} coordinates do not match {timestamps} timestamps")]
    LengthMismatch { coordinates: usize, timestamps: usize },
    #[error("viewport has no area, check map.margin_deg")]
    DegenerateViewport,
    #[error("timestamp {0} is outside the representable range")]
    TimestampOutOfRange(i64),
}
