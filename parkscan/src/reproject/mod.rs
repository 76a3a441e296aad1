//! Pixel-to-geographic reprojection.
//!
//! Maps a detection's pixel coordinates within one tile's image back to a
//! global geographic coordinate, given the tile's placement in the grid and
//! the captured viewport.
//!
//! # Algorithm
//!
//! 1. Tile pixel offset within the composed viewport image:
//!    `offset_x = col * (width / num_cols)`, `offset_y = row * (height / num_rows)`.
//! 2. Global pixel position: `gx = offset_x + x`, `gy = offset_y + y`.
//! 3. Fractional viewport position: `fx = gx / width`, `fy = 1 - gy / height`
//!    (the image origin is top-left, latitude grows from the bottom).
//! 4. Interpolate the viewport box, per the selected [`Projection`].
//! 5. Reject any non-finite or out-of-range result: the marker is dropped
//!    and logged, never propagated as an error.
//!
//! # Projection variants
//!
//! [`Projection::Linear`] (the default) interpolates latitude and longitude
//! directly across the viewport box. At the zoom levels captures run at
//! (>= 15) the Mercator distortion across one viewport is negligible, and
//! the linear form is trivial to validate against pinned values.
//!
//! [`Projection::Mercator`] interpolates in the global `256 * 2^zoom`
//! Mercator pixel space and applies the inverse Mercator latitude formula,
//! which is exact for a Web Mercator rendered viewport. Longitude is linear
//! in Mercator x, so the variants only ever disagree about latitude.

use crate::coord::{
    lat_to_mercator_y, lon_to_mercator_x, mercator_x_to_lon, mercator_y_to_lat, GeoPoint,
    Viewport,
};
use crate::detect::TileDetections;
use crate::grid::{Tile, TileGrid};

/// Strategy selection for pixel-to-geographic mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Linear interpolation across the viewport box. Default.
    #[default]
    Linear,
    /// Mercator-correct interpolation in global pixel space.
    Mercator,
}

/// Result of reprojecting one tile's detections.
#[derive(Debug, Clone, Default)]
pub struct ReprojectOutcome {
    /// Markers that passed range validation.
    pub markers: Vec<GeoPoint>,
    /// Number of detections dropped for being non-finite or out of range.
    pub rejected: usize,
}

impl Projection {
    /// Reprojects one tile's detections into geographic markers.
    ///
    /// Invalid results (non-finite, latitude outside ±90, longitude outside
    /// ±180) are dropped and counted in the outcome, never returned and
    /// never raised as errors.
    pub fn reproject(
        &self,
        detections: &TileDetections,
        tile: &Tile,
        grid: &TileGrid,
        viewport: &Viewport,
    ) -> ReprojectOutcome {
        let width = viewport.width as f64;
        let height = viewport.height as f64;
        let offset_x = tile.col as f64 * (width / grid.num_cols as f64);
        let offset_y = tile.row as f64 * (height / grid.num_rows as f64);

        let mut outcome = ReprojectOutcome::default();
        for point in &detections.points {
            let gx = offset_x + point.x;
            let gy = offset_y + point.y;

            let marker = match self {
                Projection::Linear => {
                    let fx = gx / width;
                    let fy = 1.0 - gy / height;
                    GeoPoint::new(
                        viewport.sw.lat + fy * viewport.lat_span(),
                        viewport.sw.lon + fx * viewport.lon_span(),
                    )
                }
                Projection::Mercator => {
                    let west = lon_to_mercator_x(viewport.sw.lon, viewport.zoom);
                    let east = lon_to_mercator_x(viewport.ne.lon, viewport.zoom);
                    let north = lat_to_mercator_y(viewport.ne.lat, viewport.zoom);
                    let south = lat_to_mercator_y(viewport.sw.lat, viewport.zoom);

                    // Mercator y grows southward, matching image y, so no
                    // axis inversion here.
                    let mx = west + (gx / width) * (east - west);
                    let my = north + (gy / height) * (south - north);
                    GeoPoint::new(
                        mercator_y_to_lat(my, viewport.zoom),
                        mercator_x_to_lon(mx, viewport.zoom),
                    )
                }
            };

            if marker.is_valid() {
                outcome.markers.push(marker);
            } else {
                tracing::warn!(
                    tile_id = %detections.tile_id,
                    x = point.x,
                    y = point.y,
                    lat = marker.lat,
                    lon = marker.lon,
                    "dropping out-of-range marker"
                );
                outcome.rejected += 1;
            }
        }

        outcome
    }
}
