//! Core geographic types and validation.

use thiserror::Error;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;

/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Maximum zoom level any supported imagery provider serves.
pub const MAX_ZOOM: u8 = 22;

/// Errors produced by coordinate validation and viewport planning.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude outside the valid range.
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside the valid range.
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Zoom level beyond what providers support.
    #[error("invalid zoom level: {0}")]
    InvalidZoom(u8),

    /// Viewport box is degenerate: corners inverted or zero pixel area.
    #[error("degenerate viewport: {reason}")]
    DegenerateViewport {
        /// Which invariant failed.
        reason: String,
    },
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a new geographic point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns true if both components are finite and within the full
    /// geographic range (lat ±90, lon ±180).
    ///
    /// This is the marker acceptance test: reprojected detections outside
    /// this range are dropped rather than rendered.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (MIN_LON..=MAX_LON).contains(&self.lon)
    }
}

/// The captured map viewport: a geographic bounding box plus the pixel
/// dimensions it was rendered at.
///
/// Invariants (checked by [`Viewport::validate`]):
/// - `ne.lat > sw.lat` and `ne.lon > sw.lon` (non-degenerate box; boxes
///   crossing the antimeridian are not supported)
/// - `width > 0` and `height > 0`
/// - `zoom <= MAX_ZOOM`
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Northeast corner of the visible box.
    pub ne: GeoPoint,
    /// Southwest corner of the visible box.
    pub sw: GeoPoint,
    /// Map zoom level at capture time.
    pub zoom: u8,
    /// Display width in pixels.
    pub width: u32,
    /// Display height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a new viewport.
    pub fn new(ne: GeoPoint, sw: GeoPoint, zoom: u8, width: u32, height: u32) -> Self {
        Self {
            ne,
            sw,
            zoom,
            width,
            height,
        }
    }

    /// Checks all viewport invariants.
    pub fn validate(&self) -> Result<(), CoordError> {
        for point in [&self.ne, &self.sw] {
            if !point.lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&point.lat) {
                return Err(CoordError::InvalidLatitude(point.lat));
            }
            if !point.lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&point.lon) {
                return Err(CoordError::InvalidLongitude(point.lon));
            }
        }
        if self.zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(self.zoom));
        }
        if self.ne.lat <= self.sw.lat {
            return Err(CoordError::DegenerateViewport {
                reason: format!(
                    "ne.lat ({}) must exceed sw.lat ({})",
                    self.ne.lat, self.sw.lat
                ),
            });
        }
        if self.ne.lon <= self.sw.lon {
            return Err(CoordError::DegenerateViewport {
                reason: format!(
                    "ne.lon ({}) must exceed sw.lon ({})",
                    self.ne.lon, self.sw.lon
                ),
            });
        }
        if self.width == 0 || self.height == 0 {
            return Err(CoordError::DegenerateViewport {
                reason: format!("zero pixel area ({}x{})", self.width, self.height),
            });
        }
        Ok(())
    }

    /// Latitude span of the box in degrees.
    pub fn lat_span(&self) -> f64 {
        self.ne.lat - self.sw.lat
    }

    /// Longitude span of the box in degrees.
    pub fn lon_span(&self) -> f64 {
        self.ne.lon - self.sw.lon
    }
}
