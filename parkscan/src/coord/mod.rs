//! Coordinate types and Web Mercator conversions.
//!
//! Provides the geographic primitives shared by the whole pipeline
//! ([`GeoPoint`], [`Viewport`]) and the conversions between geographic
//! coordinates and the global Web Mercator pixel space used by the
//! Mercator-correct reprojection variant.

mod types;

pub use types::{CoordError, GeoPoint, Viewport, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON};

use std::f64::consts::PI;

/// Pixel edge length of the world at zoom 0 (one 256px tile).
const TILE_SIZE: f64 = 256.0;

/// Total width/height in pixels of the world map at the given zoom.
#[inline]
pub fn world_pixel_size(zoom: u8) -> f64 {
    TILE_SIZE * 2.0_f64.powi(zoom as i32)
}

/// Converts longitude to a global Mercator pixel X coordinate.
///
/// Longitude maps linearly onto Mercator X, so this is a plain scale of
/// `(lon + 180) / 360` into the `256 * 2^zoom` pixel space.
#[inline]
pub fn lon_to_mercator_x(lon: f64, zoom: u8) -> f64 {
    (lon + 180.0) / 360.0 * world_pixel_size(zoom)
}

/// Converts latitude to a global Mercator pixel Y coordinate.
///
/// Y grows southward: y = 0 is the north edge of the projected world.
#[inline]
pub fn lat_to_mercator_y(lat: f64, zoom: u8) -> f64 {
    let lat_rad = lat * PI / 180.0;
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world_pixel_size(zoom)
}

/// Converts a global Mercator pixel X coordinate back to longitude.
#[inline]
pub fn mercator_x_to_lon(x: f64, zoom: u8) -> f64 {
    x / world_pixel_size(zoom) * 360.0 - 180.0
}

/// Converts a global Mercator pixel Y coordinate back to latitude using the
/// inverse Mercator formula.
#[inline]
pub fn mercator_y_to_lat(y: f64, zoom: u8) -> f64 {
    let n = y / world_pixel_size(zoom);
    let lat_rad = (PI * (1.0 - 2.0 * n)).sinh().atan();
    lat_rad * 180.0 / PI
}
