//! Imagery provider trait and shared types.

use std::future::Future;

use thiserror::Error;

use crate::coord::GeoPoint;
use crate::http::HttpError;

/// Errors that can occur while fetching imagery.
#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    /// HTTP transport or status failure.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Requested zoom level is outside the provider's supported range.
    #[error("unsupported zoom level: {0}")]
    UnsupportedZoom(u8),
}

/// A fetched satellite image for one tile, tagged with the owning tile's
/// identifier so downstream correlation survives out-of-order completion.
#[derive(Debug, Clone)]
pub struct TileImage {
    /// Identifier of the tile this image covers (`"row-col"`).
    pub tile_id: String,
    /// Encoded image bytes as returned by the provider (PNG or JPEG).
    pub data: Vec<u8>,
}

/// Trait for static satellite imagery providers.
///
/// A provider fetches a single static image centered on a geographic point at
/// a given zoom and pixel size. Requests are idempotent GETs, so callers may
/// retry freely; any failure is a per-tile failure, never fatal to a capture
/// run.
pub trait ImageryProvider: Send + Sync + 'static {
    /// Fetches a static image centered at `center`.
    ///
    /// # Arguments
    ///
    /// * `center` - Geographic center of the requested image
    /// * `zoom` - Zoom level
    /// * `width` - Requested image width in pixels
    /// * `height` - Requested image height in pixels
    fn fetch_image(
        &self,
        center: GeoPoint,
        zoom: u8,
        width: u32,
        height: u32,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Returns the provider's display name.
    fn name(&self) -> &str;

    /// Returns the minimum supported zoom level.
    fn min_zoom(&self) -> u8;

    /// Returns the maximum supported zoom level.
    fn max_zoom(&self) -> u8;

    /// Returns true if the provider supports the given zoom level.
    fn supports_zoom(&self, zoom: u8) -> bool {
        (self.min_zoom()..=self.max_zoom()).contains(&zoom)
    }
}
